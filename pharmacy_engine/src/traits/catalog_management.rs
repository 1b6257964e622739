use thiserror::Error;

use crate::db_types::{Medicine, NewMedicine};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Medicine with id {0} does not exist")]
    MedicineNotFound(i64),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Catalog queries and admin writes for the medicine inventory.
///
/// The order flow only consumes the read side (price and stock lookups). Stock decrements do NOT happen through this
/// trait: they are part of the atomic order-creation transaction on [`crate::traits::PharmacyDatabase`].
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_medicine(&self, medicine_id: i64) -> Result<Option<Medicine>, CatalogApiError>;

    async fn fetch_all_medicines(&self) -> Result<Vec<Medicine>, CatalogApiError>;

    /// Case-insensitive substring search on the medicine name.
    async fn search_medicines(&self, term: &str) -> Result<Vec<Medicine>, CatalogApiError>;

    /// The current stock count for the given medicine, or `None` if the medicine does not exist.
    async fn current_stock(&self, medicine_id: i64) -> Result<Option<i64>, CatalogApiError>;

    async fn insert_medicine(&self, medicine: NewMedicine) -> Result<Medicine, CatalogApiError>;

    /// Overwrites the stock count. Admin restock operation; fails if the medicine does not exist.
    async fn update_stock(&self, medicine_id: i64, stock: i64) -> Result<Medicine, CatalogApiError>;
}
