use ppg_common::Rupees;
use serde::{Deserialize, Serialize};

use crate::db_types::{Payment, PaymentStatusType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub order_id: i64,
    pub amount: Rupees,
    pub currency: String,
    pub receipt: Option<String>,
    pub note: Option<String>,
}

/// Everything the storefront client needs to open a checkout against the gateway. `key_id` is the gateway's public
/// identifier; the status label is always `"created"` at this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResult {
    pub gateway_order_id: String,
    pub amount: Rupees,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    pub key_id: String,
}

/// The checkout callback triple handed to the storefront by the gateway's browser SDK, plus the internal order id
/// the client believes it paid for. Reconciliation resolves the payment by `gateway_order_id`, never by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerificationRequest {
    pub order_id: i64,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub payment_id: i64,
    pub order_id: i64,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub amount: Rupees,
    pub status: PaymentStatusType,
    pub payment_method: Option<String>,
}

impl From<&Payment> for PaymentResult {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id,
            order_id: payment.order_id,
            gateway_order_id: payment.gateway_order_id.clone(),
            gateway_payment_id: payment.gateway_payment_id.clone(),
            amount: payment.amount,
            status: payment.status,
            payment_method: payment.payment_method.clone(),
        }
    }
}
