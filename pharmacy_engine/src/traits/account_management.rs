use thiserror::Error;

use crate::db_types::{NewUser, User};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A user with email {0} already exists")]
    UserAlreadyExists(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait resolves the externally-presented identity (the email carried in the caller's
/// auth token) to the internal user record. The engine performs this resolution exactly once at each boundary entry
/// and keys all ownership by the internal id from then on.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user with the given email, or `None` if the email is unknown.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError>;

    /// Fetches the user with the given internal id.
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError>;

    /// Creates a new user record. Registration itself (credentials, tokens) is handled outside the engine.
    async fn insert_user(&self, user: NewUser) -> Result<User, AccountApiError>;
}
