use pharmacy_engine::db_types::OrderStatusType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdateRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineSearchQuery {
    /// Substring to match against medicine names. Absent means "list everything".
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistrationRequest {
    pub email: String,
    pub name: String,
}
