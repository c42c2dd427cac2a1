//! Marketa storefront client library.
//!
//! Keeps a local, observable copy of the customer's cart in sync with the
//! storefront REST API and drives checkout through an external payment page.
//!
//! - [`cart::CartStore`] mirrors the remote cart and publishes snapshots.
//! - [`checkout::CheckoutOrchestrator`] creates payment sessions and polls
//!   for the payment result.
//! - [`gateway::CartGateway`] is the seam to the API, implemented over HTTP by
//!   [`gateway::ApiClient`] and in memory by [`gateway::InMemoryGateway`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod notify;
pub mod state;
pub mod ui;

#[cfg(test)]
mod testing;
