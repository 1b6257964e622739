use thiserror::Error;

use crate::traits::{AccountApiError, CatalogApiError, PaymentGatewayError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("No user account found for {0}")]
    IdentityNotFound(String),
    #[error("{0}")]
    DatabaseError(#[from] PaymentGatewayError),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
}

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("No user account found for {0}")]
    IdentityNotFound(String),
    #[error("Payment gateway call failed: {0}")]
    GatewayError(String),
    #[error("Payment amount {actual} does not match the order total {expected}")]
    AmountMismatch { expected: String, actual: String },
    #[error("{0}")]
    DatabaseError(#[from] PaymentGatewayError),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}
