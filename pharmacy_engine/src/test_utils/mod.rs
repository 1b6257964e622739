//! Support utilities for integration tests: database preparation and an in-process mock of the payment gateway.
pub mod mock_provider;
#[cfg(feature = "sqlite")]
pub mod prepare_env;
