use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be reached, or did not answer within the deadline. The gateway's verdict is unknown and
    /// the caller may fall back to signature-only inference.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway answered with an error status. The call itself was delivered.
    #[error("Payment gateway rejected the request. Error {status}. {message}")]
    Remote { status: u16, message: String },
    #[error("Could not interpret the gateway response: {0}")]
    InvalidResponse(String),
}

/// A request to create a remote order on the gateway. `amount` is in the currency's minor unit (paise for INR),
/// already converted without rounding loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub note: Option<String>,
}

/// The remote order created on the gateway. Its id is the key that the checkout callback is reconciled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// The authoritative state of a payment as reported by the gateway.
#[derive(Debug, Clone)]
pub struct RemotePayment {
    pub gateway_payment_id: String,
    pub status: RemotePaymentStatus,
    pub payment_method: Option<String>,
}

/// Remote payment states. Only `Captured` means the money has actually been collected; everything else is either
/// in flight or a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemotePaymentStatus {
    Created,
    Authorized,
    Captured,
    Refunded,
    Failed,
    Other(String),
}

impl RemotePaymentStatus {
    pub fn is_captured(&self) -> bool {
        matches!(self, RemotePaymentStatus::Captured)
    }
}

impl From<&str> for RemotePaymentStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "authorized" => Self::Authorized,
            "captured" => Self::Captured,
            "refunded" => Self::Refunded,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The wire contract with the external payment gateway.
///
/// Implementations must put a bounded timeout on every remote call: the payment flow invokes this trait without
/// holding any inventory or order locks, but a caller is still waiting on the other end.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider: Clone {
    /// The public key id the storefront client needs to start a checkout against this gateway.
    fn key_id(&self) -> &str;

    /// Creates a remote order for the given amount. The returned gateway order id binds all subsequent checkout
    /// callbacks to this payment intent.
    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;

    /// Fetches the authoritative status of a payment from the gateway.
    async fn fetch_payment(&self, gateway_payment_id: &str) -> Result<RemotePayment, GatewayError>;

    /// Verifies the checkout callback signature over `"{gateway_order_id}|{gateway_payment_id}"` against the shared
    /// secret. Implementations must use a constant-time comparison.
    fn verify_checkout_signature(&self, gateway_order_id: &str, gateway_payment_id: &str, signature: &str) -> bool;
}
