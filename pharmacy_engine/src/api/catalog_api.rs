use crate::{
    db_types::{Medicine, NewMedicine},
    traits::{CatalogApiError, CatalogManagement},
};

/// Thin wrapper over the catalog backend. Reads feed the storefront; writes are the admin restock surface.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn medicine_by_id(&self, medicine_id: i64) -> Result<Option<Medicine>, CatalogApiError> {
        self.db.fetch_medicine(medicine_id).await
    }

    pub async fn all_medicines(&self) -> Result<Vec<Medicine>, CatalogApiError> {
        self.db.fetch_all_medicines().await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Medicine>, CatalogApiError> {
        self.db.search_medicines(term).await
    }

    pub async fn stock_on_hand(&self, medicine_id: i64) -> Result<Option<i64>, CatalogApiError> {
        self.db.current_stock(medicine_id).await
    }

    pub async fn add_medicine(&self, medicine: NewMedicine) -> Result<Medicine, CatalogApiError> {
        self.db.insert_medicine(medicine).await
    }

    pub async fn restock(&self, medicine_id: i64, stock: i64) -> Result<Medicine, CatalogApiError> {
        self.db.update_stock(medicine_id, stock).await
    }
}
