use crate::{
    db_types::{NewUser, User},
    traits::{AccountApiError, AccountManagement},
};

/// Identity resolution for the HTTP boundary. Credentials and token issuance live outside the engine.
#[derive(Debug, Clone)]
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_email(email).await
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_id(user_id).await
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        self.db.insert_user(user).await
    }
}
