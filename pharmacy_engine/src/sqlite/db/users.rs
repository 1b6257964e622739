use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    traits::AccountApiError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, AccountApiError> {
    let result = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (email, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(user.email.clone())
    .bind(user.name)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(user) => Ok(user),
        Err(e) if e.as_database_error().is_some_and(|de| de.is_unique_violation()) => {
            Err(AccountApiError::UserAlreadyExists(user.email))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}
