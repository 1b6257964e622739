//! Pharmacy Payment Engine
//!
//! The pharmacy payment engine contains the core logic of the pharmacy storefront backend: order creation with
//! atomic inventory decrement, payment-intent creation against an external payment gateway, and the reconciliation
//! of gateway checkout callbacks with local order and payment state.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the
//!    database, defined in the `db_types` module, which are public.
//! 2. The engine public API ([`mod@api`]). This provides the public-facing functionality: the order flow, the
//!    payment flow, the catalog, and identity resolution. Backends implement the traits in [`mod@traits`] to plug
//!    in underneath.
//! 3. The collaborator contracts ([`mod@traits`]). Most notably [`traits::PaymentProvider`], the wire contract
//!    with the external payment gateway. The engine never talks to the gateway directly.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain
//! actions occur within the engine; for example, when the ownership-reconciliation policy reassigns an order, an
//! `OwnershipReconciled` event is emitted. A simple actor framework lets you hook into these events and perform
//! custom actions.
pub mod api;
pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    accounts_api::AccountApi,
    catalog_api::CatalogApi,
    errors::{OrderFlowError, PaymentFlowError},
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_flow_api::PaymentFlowApi,
    payment_objects,
};
