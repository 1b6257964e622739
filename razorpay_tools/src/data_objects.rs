use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /v1/orders`. Amounts are always in the minor currency unit (paise for INR).
#[derive(Debug, Clone, Serialize)]
pub struct NewRazorpayOrder {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

impl NewRazorpayOrder {
    pub fn new(amount: i64, currency: &str) -> Self {
        Self { amount, currency: currency.to_string(), receipt: None, notes: None }
    }

    pub fn with_receipt(mut self, receipt: &str) -> Self {
        self.receipt = Some(receipt.to_string());
        self
    }

    /// Razorpay's `notes` field is a string-keyed map. The free-text order note goes under `description`.
    pub fn with_note(mut self, note: &str) -> Self {
        self.notes = Some(serde_json::json!({ "description": note }));
        self
    }
}

/// A remote order as returned by `POST /v1/orders` and `GET /v1/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// A remote payment as returned by `GET /v1/payments/{id}`.
///
/// `status` is one of `created`, `authorized`, `captured`, `refunded` or `failed`. Only `captured` means the money
/// has actually been collected.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl RazorpayPayment {
    pub fn is_captured(&self) -> bool {
        self.status.eq_ignore_ascii_case("captured")
    }
}
