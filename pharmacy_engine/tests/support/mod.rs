//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use pharmacy_engine::{
    db_types::{Medicine, NewMedicine, NewUser, User},
    test_utils::{
        mock_provider::MockPaymentProvider,
        prepare_env::{prepare_test_env, random_db_path},
    },
    traits::{AccountManagement, CatalogManagement},
    SqliteDatabase,
};
use ppg_common::Rupees;

pub const KEY_ID: &str = "rzp_test_mockkey";
pub const SECRET: &str = "mock_secret_k3y";

pub async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub fn new_provider() -> MockPaymentProvider {
    MockPaymentProvider::new(KEY_ID, SECRET)
}

pub async fn seed_user(db: &SqliteDatabase, email: &str, name: &str) -> User {
    db.insert_user(NewUser::new(email, name)).await.expect("Error inserting user")
}

pub async fn seed_medicine(db: &SqliteDatabase, name: &str, price_paise: i64, stock: i64) -> Medicine {
    let medicine = NewMedicine::new(name, Rupees::from_paise(price_paise), stock);
    db.insert_medicine(medicine).await.expect("Error inserting medicine")
}
