//! Marketa Core - Shared types library.
//!
//! This crate provides the data types shared by the Marketa storefront client:
//! - `storefront` - Cart store, checkout orchestration and the REST gateway
//! - `cli` - Terminal front end for browsing the cart and checking out
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! Every type mirrors a shape returned by the storefront REST API and is
//! (de)serialised with `serde`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, products, cart lines and checkout sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
