use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        errors::OrderFlowError,
        order_objects::{OrderRequest, OrderResult},
    },
    db_types::{NewOrder, NewOrderItem, Order, OrderStatusType},
    events::{EventProducers, OrderCreatedEvent},
    traits::{PaymentGatewayError, PharmacyDatabase},
};

/// `OrderFlowApi` handles order creation and order queries for the storefront.
///
/// Order creation is the only flow that touches the inventory ledger: each requested line is validated and
/// conditionally decremented inside a single backend transaction, so stock can never go negative and a failed line
/// aborts the whole order.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: PharmacyDatabase
{
    /// Creates a new order on behalf of the caller identified by `email`.
    ///
    /// The email is resolved to an internal user id before anything else; an unknown email fails with
    /// [`OrderFlowError::IdentityNotFound`]. Each line's unit price is snapshotted at decrement time and the total
    /// is the exact sum of the line totals. The order is created with `Pending` status.
    pub async fn create_order(&self, email: &str, request: OrderRequest) -> Result<OrderResult, OrderFlowError> {
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| OrderFlowError::IdentityNotFound(email.to_string()))?;
        let items = request.items.iter().map(|i| NewOrderItem::new(i.medicine_id, i.quantity)).collect();
        let order = NewOrder {
            user_id: user.id,
            items,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
        };
        let (order, items) = self.db.process_new_order(order).await?;
        debug!("🛒️📦️ Order #{} created for user #{} with total {}", order.id, order.user_id, order.total_amount);
        self.call_order_created_hook(&order).await;
        Ok(OrderResult::from((order, items)))
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            trace!("🛒️📦️ Notifying order created hook subscribers");
            let event = OrderCreatedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<OrderResult>, OrderFlowError> {
        let order = self.db.fetch_order_by_id(order_id).await?;
        Ok(order.map(OrderResult::from))
    }

    /// All orders belonging to the user identified by `email`.
    ///
    /// Uses the same identity mapping as order creation. An unknown email yields an empty list rather than an
    /// error; this is a defined fallback for freshly-registered users with no history.
    pub async fn orders_for_user(&self, email: &str) -> Result<Vec<OrderResult>, OrderFlowError> {
        let user = match self.db.fetch_user_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("🛒️📦️ No user found with email {email}. Returning an empty order list.");
                return Ok(Vec::new());
            },
        };
        let orders = self.db.fetch_orders_for_user(user.id).await?;
        Ok(orders.into_iter().map(OrderResult::from).collect())
    }

    /// Every order in the store. Admin surface.
    pub async fn all_orders(&self) -> Result<Vec<OrderResult>, OrderFlowError> {
        let orders = self.db.fetch_all_orders().await?;
        Ok(orders.into_iter().map(OrderResult::from).collect())
    }

    /// Overwrites the status of an order. Used by the fulfilment tracking surface (`Processing`, `Shipped`,
    /// `Delivered`, `Cancelled`). The one restriction is that no order can return to `Pending`.
    pub async fn update_status(&self, order_id: i64, status: OrderStatusType) -> Result<OrderResult, OrderFlowError> {
        let updated = self.db.update_order_status(order_id, status).await?;
        info!("🛒️📦️ Order #{} status set to {}", updated.id, updated.status);
        let items = self
            .db
            .fetch_order_by_id(order_id)
            .await?
            .map(|(_, items)| items)
            .ok_or(PaymentGatewayError::OrderNotFound(order_id))?;
        Ok(OrderResult::from((updated, items)))
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
