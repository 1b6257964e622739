use chrono::{DateTime, Utc};
use ppg_common::Rupees;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem, OrderStatusType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub medicine_id: i64,
    pub quantity: i64,
}

/// An order as returned to callers: every line carries its snapshotted unit price and materialized line total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<OrderItemResult>,
    pub total_amount: Rupees,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResult {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub quantity: i64,
    pub unit_price: Rupees,
    pub line_total: Rupees,
}

impl From<&OrderItem> for OrderItemResult {
    fn from(item: &OrderItem) -> Self {
        Self {
            medicine_id: item.medicine_id,
            medicine_name: item.medicine_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for OrderResult {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        let items = items.iter().map(OrderItemResult::from).collect();
        Self {
            id: order.id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
        }
    }
}
