use std::time::Duration;

use log::*;
use ppg_common::Secret;

const DEFAULT_API_URL: &str = "https://api.razorpay.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// The public key id. This is not a secret; the storefront client needs it to open the checkout widget.
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_url: String,
    /// Upper bound on any single call to the gateway. Calls past this deadline fail rather than block the caller.
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::default(),
            key_secret: Secret::default(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("RAZORPAY_KEY_ID not set. Gateway calls will be rejected upstream.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("RAZORPAY_KEY_SECRET not set. Signature verification will fail.");
            String::default()
        }));
        let api_url = std::env::var("RAZORPAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = std::env::var("RAZORPAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { key_id, key_secret, api_url, timeout }
    }
}
