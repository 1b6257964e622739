//! # Pharmacy payment gateway server
//! This crate hosts the HTTP boundary for the pharmacy storefront. It is responsible for:
//! * Authenticating callers (JWT bearer tokens carrying the user's email).
//! * Translating HTTP requests into engine API calls: catalog queries, order creation, payment intents and checkout
//!   verification.
//! * Adapting the Razorpay REST client to the engine's [`pharmacy_engine::traits::PaymentProvider`] contract.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
