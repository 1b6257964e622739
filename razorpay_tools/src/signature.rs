//! # Checkout callback signature
//!
//! When the customer completes checkout in the browser, Razorpay hands the storefront a
//! `(order_id, payment_id, signature)` triple. The signature is an HMAC-SHA256 over the canonical string
//!
//! ```text
//!     {order_id}|{payment_id}
//! ```
//!
//! keyed with the merchant's API secret, and hex-encoded. The storefront forwards the triple to the server, which
//! must verify it before trusting anything else in the callback: without this check anyone could claim an arbitrary
//! payment id settled an arbitrary order.
//!
//! Verification decodes the hex and compares with [`Mac::verify_slice`], which is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The canonical payload that the checkout signature commits to.
pub fn signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Computes the hex-encoded checkout signature for the given ids. Used by tests and tooling; the live signature is
/// computed by Razorpay.
pub fn checkout_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(signature_payload(order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a checkout signature against the shared secret. A malformed (non-hex) signature is simply invalid.
pub fn verify_checkout_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(signature_payload(order_id, payment_id).as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "test_secret_k3y";

    #[test]
    fn valid_signature_verifies() {
        let sig = checkout_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", SECRET);
        assert!(verify_checkout_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", &sig, SECRET));
    }

    #[test]
    fn tampered_ids_fail_verification() {
        let sig = checkout_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", SECRET);
        assert!(!verify_checkout_signature("order_9A33XWu170gUtm", "pay_somebodyelse", &sig, SECRET));
        assert!(!verify_checkout_signature("order_other", "pay_29QQoUBi66xm2f", &sig, SECRET));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let sig = checkout_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", SECRET);
        assert!(!verify_checkout_signature("order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f", &sig, "other_secret"));
    }

    #[test]
    fn garbage_signature_is_invalid() {
        assert!(!verify_checkout_signature("order_1", "pay_1", "not-hex-at-all", SECRET));
        assert!(!verify_checkout_signature("order_1", "pay_1", "", SECRET));
    }
}
