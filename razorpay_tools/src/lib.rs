//! A thin client for the Razorpay REST API.
//!
//! Covers the two calls the payment gateway needs - creating a remote order and fetching the authoritative status of
//! a payment - plus verification of the checkout callback signature that Razorpay's browser SDK hands back to the
//! storefront after the customer completes checkout.

mod api;
mod config;
mod error;
mod signature;

mod data_objects;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment};
pub use error::RazorpayApiError;
pub use signature::{checkout_signature, verify_checkout_signature};
