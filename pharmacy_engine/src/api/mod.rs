//! # Pharmacy payment engine public API
//!
//! The `api` module exposes the programmatic API of the engine. It is modular, so that clients can pick and choose
//! the functionality they need:
//!
//! * [`order_flow_api`] handles order creation (with atomic stock decrement), order queries and fulfilment status
//!   updates.
//! * [`payment_flow_api`] handles the payment lifecycle: creating a gateway payment intent for an order, and
//!   reconciling checkout callbacks against gateway truth.
//! * [`catalog_api`] exposes the medicine catalog.
//! * [`accounts_api`] resolves user identities.
//!
//! The pattern for using all the APIs is the same: an API instance is created by supplying a database backend that
//! implements the backend traits the API requires, e.g.
//!
//! ```rust,ignore
//! use pharmacy_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/pharmacy.db", 25).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.create_order("alice@example.com", request).await?;
//! ```

pub mod accounts_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_flow_api;
pub mod payment_objects;
