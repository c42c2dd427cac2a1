//! Core types for Marketa.
//!
//! This module provides type-safe wrappers for the storefront domain.

pub mod cart;
pub mod checkout;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::CartLine;
pub use checkout::{CheckoutSession, CheckoutStart};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{CategoryRef, ProductImage, ProductSnapshot};
pub use status::*;
