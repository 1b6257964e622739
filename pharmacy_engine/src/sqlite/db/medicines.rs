use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Medicine, NewMedicine},
    traits::CatalogApiError,
};

/// The result of a conditional stock decrement.
#[derive(Debug, Clone)]
pub enum StockDecrement {
    /// The decrement was applied. The returned row carries the post-decrement stock and the price that was current
    /// at decrement time, i.e. the price to snapshot on the order line.
    Decremented(Medicine),
    Insufficient { medicine: Medicine },
    NotFound,
}

/// Decrements the stock of a medicine by `quantity`, but only if at least that much stock is available.
///
/// The guard lives inside the `UPDATE` statement itself, so concurrent decrements on the same row serialize and the
/// stock count can never go below zero, no matter how many order-creation transactions race on the item.
pub async fn decrement_stock_checked(
    medicine_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<StockDecrement, sqlx::Error> {
    let updated = sqlx::query_as::<_, Medicine>(
        r#"
            UPDATE medicines SET stock = stock - $2, updated_at = $3
            WHERE id = $1 AND stock >= $2
            RETURNING *;
        "#,
    )
    .bind(medicine_id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(medicine) => {
            debug!("🗃️ Stock of medicine #{medicine_id} decremented by {quantity} to {}", medicine.stock);
            Ok(StockDecrement::Decremented(medicine))
        },
        None => match fetch_medicine_by_id(medicine_id, conn).await? {
            Some(medicine) => Ok(StockDecrement::Insufficient { medicine }),
            None => Ok(StockDecrement::NotFound),
        },
    }
}

pub async fn insert_medicine(medicine: NewMedicine, conn: &mut SqliteConnection) -> Result<Medicine, CatalogApiError> {
    let now = Utc::now();
    let medicine = sqlx::query_as(
        r#"
            INSERT INTO medicines (name, brand, price, stock, description, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(medicine.name)
    .bind(medicine.brand)
    .bind(medicine.price.value())
    .bind(medicine.stock)
    .bind(medicine.description)
    .bind(medicine.category)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(medicine)
}

pub async fn fetch_medicine_by_id(
    medicine_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Medicine>, sqlx::Error> {
    let medicine =
        sqlx::query_as("SELECT * FROM medicines WHERE id = $1").bind(medicine_id).fetch_optional(conn).await?;
    Ok(medicine)
}

pub async fn fetch_all_medicines(conn: &mut SqliteConnection) -> Result<Vec<Medicine>, sqlx::Error> {
    let medicines = sqlx::query_as("SELECT * FROM medicines ORDER BY name").fetch_all(conn).await?;
    Ok(medicines)
}

pub async fn search_medicines(term: &str, conn: &mut SqliteConnection) -> Result<Vec<Medicine>, sqlx::Error> {
    let medicines = sqlx::query_as("SELECT * FROM medicines WHERE name LIKE $1 ORDER BY name")
        .bind(format!("%{term}%"))
        .fetch_all(conn)
        .await?;
    Ok(medicines)
}

pub async fn current_stock(medicine_id: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let stock = sqlx::query_scalar("SELECT stock FROM medicines WHERE id = $1")
        .bind(medicine_id)
        .fetch_optional(conn)
        .await?;
    Ok(stock)
}

pub async fn update_stock(
    medicine_id: i64,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<Medicine, CatalogApiError> {
    let medicine = sqlx::query_as::<_, Medicine>(
        "UPDATE medicines SET stock = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(medicine_id)
    .bind(stock)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    medicine.ok_or(CatalogApiError::MedicineNotFound(medicine_id))
}
