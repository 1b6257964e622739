use chrono::{DateTime, Utc};
use log::debug;
use ppg_common::Rupees;
use sqlx::SqliteConnection;

use crate::db_types::{Order, OrderItem, OrderStatusType};

/// Inserts the order row. Line items are inserted separately with [`insert_order_item`]; callers are expected to
/// run both inside the same transaction.
pub async fn insert_order(
    user_id: i64,
    total_amount: Rupees,
    shipping_address: &str,
    payment_method: &str,
    created_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (user_id, total_amount, status, shipping_address, payment_method, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(total_amount.value())
    .bind(OrderStatusType::Pending)
    .bind(shipping_address)
    .bind(payment_method)
    .bind(created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user #{user_id}", order.id);
    Ok(order)
}

pub async fn insert_order_item(
    order_id: i64,
    medicine_id: i64,
    medicine_name: &str,
    quantity: i64,
    unit_price: Rupees,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, medicine_id, medicine_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(medicine_id)
    .bind(medicine_name)
    .bind(quantity)
    .bind(unit_price.value())
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// All orders for the given user, oldest first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at").fetch_all(conn).await?;
    Ok(orders)
}

pub async fn update_status(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(order_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn update_owner(
    order_id: i64,
    new_user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET user_id = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(order_id)
        .bind(new_user_id)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}
