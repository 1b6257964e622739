use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use ppg_common::Rupees;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
/// The lifecycle status of an order.
///
/// Orders are created as `Pending`. The payment flow advances them to `Processing`, `Completed` or `PaymentFailed`;
/// the fulfilment states (`Shipped`, `Delivered`, `Cancelled`) are set by the explicit status-update operation. No
/// path leads back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// Newly created; no payment attempt has been made.
    Pending,
    /// A payment is underway but not yet captured, or the order is being prepared.
    Processing,
    /// Payment has been captured in full.
    Completed,
    /// The last payment attempt failed verification or was declined.
    PaymentFailed,
    Shipped,
    Delivered,
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "PENDING"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Completed => write!(f, "COMPLETED"),
            OrderStatusType::PaymentFailed => write!(f, "PAYMENT_FAILED"),
            OrderStatusType::Shipped => write!(f, "SHIPPED"),
            OrderStatusType::Delivered => write!(f, "DELIVERED"),
            OrderStatusType::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "PAYMENT_FAILED" => Ok(Self::PaymentFailed),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------  PaymentStatusType  ---------------------------------------------------------
/// The lifecycle status of a payment record.
///
/// Transitions are monotonic towards the terminal set {`Completed`, `Failed`}: `Created → Processing → Completed`,
/// `Created → Failed`, `Processing → Failed`. Once terminal, a payment never changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatusType {
    Created,
    Processing,
    Completed,
    Failed,
}

impl PaymentStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatusType::Completed | PaymentStatusType::Failed)
    }

    /// Whether a transition from `self` to `next` respects the monotonic state machine.
    pub fn can_transition_to(&self, next: PaymentStatusType) -> bool {
        use PaymentStatusType::*;
        matches!(
            (self, next),
            (Created, Processing) | (Created, Completed) | (Created, Failed) | (Processing, Completed) | (Processing, Failed)
        )
    }
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Created => write!(f, "CREATED"),
            PaymentStatusType::Processing => write!(f, "PROCESSING"),
            PaymentStatusType::Completed => write!(f, "COMPLETED"),
            PaymentStatusType::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        User         ---------------------------------------------------------
/// A storefront user. Registration and login live outside the engine; the engine only resolves emails to internal
/// ids so that order and payment ownership is always keyed by `id`, never by the externally-presented email.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(email: S, name: S) -> Self {
        Self { email: email.into(), name: name.into() }
    }
}

//--------------------------------------      Medicine       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub price: Rupees,
    pub stock: i64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub brand: Option<String>,
    pub price: Rupees,
    pub stock: i64,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl NewMedicine {
    pub fn new<S: Into<String>>(name: S, price: Rupees, stock: i64) -> Self {
        Self { name: name.into(), brand: None, price, stock, description: None, category: None }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// The exact sum of the snapshotted line totals. Line items are immutable after creation, so this never drifts.
    pub total_amount: Rupees,
    pub status: OrderStatusType,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. `unit_price` and `medicine_name` are snapshots taken at the moment the stock was decremented;
/// later catalog edits do not affect existing orders.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub quantity: i64,
    pub unit_price: Rupees,
}

impl OrderItem {
    pub fn line_total(&self) -> Rupees {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The internal id of the owning user, already resolved from the caller's email.
    pub user_id: i64,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub medicine_id: i64,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn new(medicine_id: i64, quantity: i64) -> Self {
        Self { medicine_id, quantity }
    }
}

//--------------------------------------       Payment       ---------------------------------------------------------
/// A payment attempt against an order. `gateway_order_id` is unique; reconciliation always resolves a payment by
/// this key, never by the client-supplied order id alone.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub signature: Option<String>,
    pub amount: Rupees,
    pub currency: String,
    pub status: PaymentStatusType,
    pub payment_method: Option<String>,
    pub receipt: Option<String>,
    pub note: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub user_id: i64,
    pub gateway_order_id: String,
    pub amount: Rupees,
    pub currency: String,
    pub receipt: Option<String>,
    pub note: Option<String>,
}

impl NewPayment {
    pub fn new(order_id: i64, user_id: i64, gateway_order_id: String, amount: Rupees, currency: &str) -> Self {
        Self { order_id, user_id, gateway_order_id, amount, currency: currency.to_string(), receipt: None, note: None }
    }
}

/// The result of a verification attempt, to be applied to the payment row and its order in a single transaction.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub payment_id: i64,
    pub order_id: i64,
    pub gateway_payment_id: String,
    pub signature: String,
    pub payment_status: PaymentStatusType,
    pub order_status: OrderStatusType,
    pub payment_method: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_round_trips_through_wire_labels() {
        for status in [
            OrderStatusType::Pending,
            OrderStatusType::Processing,
            OrderStatusType::Completed,
            OrderStatusType::PaymentFailed,
            OrderStatusType::Shipped,
            OrderStatusType::Delivered,
            OrderStatusType::Cancelled,
        ] {
            let parsed: OrderStatusType = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(OrderStatusType::PaymentFailed.to_string(), "PAYMENT_FAILED");
    }

    #[test]
    fn payment_status_transitions_are_monotonic() {
        use PaymentStatusType::*;
        assert!(Created.can_transition_to(Processing));
        assert!(Created.can_transition_to(Completed));
        assert!(Created.can_transition_to(Failed));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Created));
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            medicine_id: 7,
            medicine_name: "Paracetamol 500mg".into(),
            quantity: 3,
            unit_price: Rupees::from_paise(1999),
        };
        assert_eq!(item.line_total(), Rupees::from_paise(5997));
    }
}
