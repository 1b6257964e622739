//! `SqliteDatabase` is a concrete implementation of a pharmacy payment gateway backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. The transactional guarantees of the engine live here: order creation and verification reconciliation
//! each run inside a single SQLite transaction.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use ppg_common::Rupees;
use sqlx::SqlitePool;

use super::db::{db_url, medicines, new_pool, orders, payments, users};
use crate::{
    db_types::{
        Medicine,
        NewMedicine,
        NewOrder,
        NewPayment,
        NewUser,
        Order,
        OrderItem,
        OrderStatusType,
        Payment,
        User,
        VerificationOutcome,
    },
    sqlite::db::medicines::StockDecrement,
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogApiError,
        CatalogManagement,
        PaymentGatewayError,
        PharmacyDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Opens the database named by `PPG_DATABASE_URL`, or the default store.
    pub async fn new_default(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AccountApiError::DatabaseError(e.to_string()))?;
        let user = users::fetch_user_by_email(email, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AccountApiError::DatabaseError(e.to_string()))?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AccountApiError::DatabaseError(e.to_string()))?;
        users::insert_user(user, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_medicine(&self, medicine_id: i64) -> Result<Option<Medicine>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        let medicine = medicines::fetch_medicine_by_id(medicine_id, &mut conn).await?;
        Ok(medicine)
    }

    async fn fetch_all_medicines(&self) -> Result<Vec<Medicine>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        let medicines = medicines::fetch_all_medicines(&mut conn).await?;
        Ok(medicines)
    }

    async fn search_medicines(&self, term: &str) -> Result<Vec<Medicine>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        let medicines = medicines::search_medicines(term, &mut conn).await?;
        Ok(medicines)
    }

    async fn current_stock(&self, medicine_id: i64) -> Result<Option<i64>, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        let stock = medicines::current_stock(medicine_id, &mut conn).await?;
        Ok(stock)
    }

    async fn insert_medicine(&self, medicine: NewMedicine) -> Result<Medicine, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        medicines::insert_medicine(medicine, &mut conn).await
    }

    async fn update_stock(&self, medicine_id: i64, stock: i64) -> Result<Medicine, CatalogApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| CatalogApiError::DatabaseError(e.to_string()))?;
        medicines::update_stock(medicine_id, stock, &mut conn).await
    }
}

impl PharmacyDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Takes a new order and, in a single atomic transaction:
    /// * conditionally decrements stock for every line, snapshotting the name and unit price at decrement time,
    /// * computes the exact total from the snapshots,
    /// * inserts the order with `Pending` status and its line items.
    ///
    /// Any line failure rolls the whole transaction back, including decrements already applied for earlier lines.
    async fn process_new_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let mut total = Rupees::default();
        let mut snapshots = Vec::with_capacity(order.items.len());
        for line in &order.items {
            if line.quantity <= 0 {
                return Err(PaymentGatewayError::InvalidQuantity {
                    medicine_id: line.medicine_id,
                    quantity: line.quantity,
                });
            }
            match medicines::decrement_stock_checked(line.medicine_id, line.quantity, &mut tx).await? {
                StockDecrement::Decremented(medicine) => {
                    total += medicine.price * line.quantity;
                    snapshots.push((line.quantity, medicine));
                },
                StockDecrement::Insufficient { medicine } => {
                    debug!(
                        "🗃️ Order for user #{} aborted: {} has {} in stock, {} requested",
                        order.user_id, medicine.name, medicine.stock, line.quantity
                    );
                    return Err(PaymentGatewayError::InsufficientStock {
                        medicine_id: medicine.id,
                        name: medicine.name,
                        requested: line.quantity,
                        available: medicine.stock,
                    });
                },
                StockDecrement::NotFound => {
                    return Err(PaymentGatewayError::MedicineNotFound(line.medicine_id));
                },
            }
        }
        let order_row = orders::insert_order(
            order.user_id,
            total,
            &order.shipping_address,
            &order.payment_method,
            Utc::now(),
            &mut tx,
        )
        .await?;
        let mut items = Vec::with_capacity(snapshots.len());
        for (quantity, medicine) in snapshots {
            let item = orders::insert_order_item(
                order_row.id,
                medicine.id,
                &medicine.name,
                quantity,
                medicine.price,
                &mut tx,
            )
            .await?;
            items.push(item);
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} committed with {} lines, total {total}", order_row.id, items.len());
        Ok((order_row, items))
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<(Order, Vec<OrderItem>)>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_by_id(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(Some((order, items)))
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<(Order, Vec<OrderItem>)>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            result.push((order, items));
        }
        Ok(result)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<(Order, Vec<OrderItem>)>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            result.push((order, items));
        }
        Ok(result)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError> {
        if status == OrderStatusType::Pending {
            return Err(PaymentGatewayError::OrderStatusUpdateError(
                "No order may return to PENDING status".to_string(),
            ));
        }
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_status(order_id, status, &mut conn).await?;
        order.ok_or(PaymentGatewayError::OrderNotFound(order_id))
    }

    async fn reassign_order_owner(&self, order_id: i64, new_user_id: i64) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_owner(order_id, new_user_id, &mut conn).await?;
        order.ok_or(PaymentGatewayError::OrderNotFound(order_id))
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_gateway_order_id(gateway_order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_first_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_first_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn reassign_payment_owner(&self, payment_id: i64, new_user_id: i64) -> Result<Payment, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::update_owner(payment_id, new_user_id, &mut conn).await?;
        payment.ok_or_else(|| PaymentGatewayError::PaymentNotFound(format!("id #{payment_id}")))
    }

    /// Applies a verification outcome to the payment and its order in one transaction.
    ///
    /// The payment state machine is enforced here, under the transaction, so racing verification attempts cannot
    /// move a payment out of a terminal status: a repeat that lands on the same terminal status returns the stored
    /// rows untouched, and a conflicting transition is rejected.
    async fn record_verification_outcome(
        &self,
        outcome: VerificationOutcome,
    ) -> Result<(Payment, Order), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let payment = payments::fetch_payment_by_id(outcome.payment_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(format!("id #{}", outcome.payment_id)))?;
        if payment.status.is_terminal() {
            if payment.status == outcome.payment_status {
                let order = orders::fetch_order_by_id(payment.order_id, &mut tx)
                    .await?
                    .ok_or(PaymentGatewayError::OrderNotFound(payment.order_id))?;
                debug!("🗃️ Payment #{} already {}; nothing to record", payment.id, payment.status);
                return Ok((payment, order));
            }
            return Err(PaymentGatewayError::PaymentStatusUpdateError(format!(
                "Payment #{} is {} and cannot become {}",
                payment.id, payment.status, outcome.payment_status
            )));
        }
        if payment.status != outcome.payment_status && !payment.status.can_transition_to(outcome.payment_status) {
            return Err(PaymentGatewayError::PaymentStatusUpdateError(format!(
                "Payment #{} cannot move from {} to {}",
                payment.id, payment.status, outcome.payment_status
            )));
        }
        let payment = payments::apply_verification(&outcome, &mut tx).await?;
        let order = orders::update_status(outcome.order_id, outcome.order_status, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::OrderNotFound(outcome.order_id))?;
        tx.commit().await?;
        debug!("🗃️ Verification recorded: payment #{} {} / order #{} {}", payment.id, payment.status, order.id, order.status);
        Ok((payment, order))
    }
}
