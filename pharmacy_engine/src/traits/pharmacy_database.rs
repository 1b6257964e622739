use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderItem, OrderStatusType, Payment, VerificationOutcome},
    traits::{AccountApiError, AccountManagement, CatalogApiError, CatalogManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the pharmacy payment gateway.
///
/// This behaviour includes:
/// * Atomic order creation: stock validation, conditional decrement, price snapshotting and the order insert all
///   happen inside a single transaction. Either every line commits or none does.
/// * Payment persistence, keyed uniquely by the gateway order id.
/// * Transactional reconciliation: applying a verification outcome to the payment row and the order row together.
#[allow(async_fn_in_trait)]
pub trait PharmacyDatabase: Clone + AccountManagement + CatalogManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction:
    /// * conditionally decrements the stock of every requested line (`stock >= quantity`, per item),
    /// * snapshots each line's name and unit price at decrement time,
    /// * computes the exact total,
    /// * inserts the order with `Pending` status.
    ///
    /// If any line fails (unknown medicine, insufficient stock), the whole transaction rolls back: stock counts are
    /// untouched and no order row exists afterwards.
    async fn process_new_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError>;

    /// Fetches an order and its line items.
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<(Order, Vec<OrderItem>)>, PaymentGatewayError>;

    /// Fetches all orders owned by the given internal user id, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<(Order, Vec<OrderItem>)>, PaymentGatewayError>;

    /// Fetches every order in the store, oldest first. Admin surface.
    async fn fetch_all_orders(&self) -> Result<Vec<(Order, Vec<OrderItem>)>, PaymentGatewayError>;

    /// Overwrites the order status. The single restriction is that no order can return to `Pending`; everything else
    /// is an unchecked overwrite used by the fulfilment tracking surface.
    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError>;

    /// Reassigns the order to a new owner. Only called by the ownership-reconciliation policy in the payment flow.
    async fn reassign_order_owner(&self, order_id: i64, new_user_id: i64) -> Result<Order, PaymentGatewayError>;

    /// Inserts a payment row with `Created` status. The gateway order id must be unique; a duplicate insert fails
    /// with [`PaymentGatewayError::PaymentAlreadyExists`].
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError>;

    /// Resolves a payment by its gateway order id. This is the only lookup the verification flow trusts.
    async fn fetch_payment_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Payment>, PaymentGatewayError>;

    /// The first payment recorded against the given order, if any.
    async fn fetch_first_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, PaymentGatewayError>;

    /// Reassigns the payment to a new owner. Only called by the ownership-reconciliation policy.
    async fn reassign_payment_owner(&self, payment_id: i64, new_user_id: i64) -> Result<Payment, PaymentGatewayError>;

    /// Applies a verification outcome to the payment row and its order in one transaction. Rejects transitions out
    /// of a terminal payment status, keeping the payment state machine monotonic under concurrent verification
    /// attempts.
    async fn record_verification_outcome(
        &self,
        outcome: VerificationOutcome,
    ) -> Result<(Payment, Order), PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Medicine with id {0} does not exist")]
    MedicineNotFound(i64),
    #[error("Not enough stock of {name}: requested {requested}, available {available}")]
    InsufficientStock { medicine_id: i64, name: String, requested: i64, available: i64 },
    #[error("Invalid quantity {quantity} for medicine {medicine_id}")]
    InvalidQuantity { medicine_id: i64, quantity: i64 },
    #[error("Cannot insert payment, since one already exists for gateway order {0}")]
    PaymentAlreadyExists(String),
    #[error("The requested payment does not exist for gateway order {0}")]
    PaymentNotFound(String),
    #[error("Illegal payment status change. {0}")]
    PaymentStatusUpdateError(String),
    #[error("Illegal order status change. {0}")]
    OrderStatusUpdateError(String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
