use serde::{Deserialize, Serialize};

use crate::db_types::{Order, Payment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted when a verification attempt settles a payment as `Completed` and its order as `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettledEvent {
    pub payment: Payment,
    pub order: Order,
}

impl PaymentSettledEvent {
    pub fn new(payment: Payment, order: Order) -> Self {
        Self { payment, order }
    }
}

/// Emitted when a verification attempt marks a payment `Failed` and its order `PaymentFailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFailedEvent {
    pub payment: Payment,
    pub order: Order,
}

impl PaymentFailedEvent {
    pub fn new(payment: Payment, order: Order) -> Self {
        Self { payment, order }
    }
}

/// Emitted whenever the ownership-reconciliation policy reassigns a stored owner to the authenticated caller
/// instead of rejecting the request. This is a trust-relevant action; subscribers typically audit-log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipReconciledEvent {
    pub entity: ReconciledEntity,
    pub previous_user_id: i64,
    pub new_user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciledEntity {
    Order(i64),
    Payment(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventType {
    OrderCreated(OrderCreatedEvent),
    PaymentSettled(PaymentSettledEvent),
    PaymentFailed(PaymentFailedEvent),
    OwnershipReconciled(OwnershipReconciledEvent),
}
