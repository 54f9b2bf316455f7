//! Jhytermax storefront client library.
//!
//! Everything a buyer-facing front-end needs to talk to the marketplace
//! REST API: the [`session`] client with its refresh-once recovery, the
//! typed [`api`] wrapper, the in-memory [`cart`], [`checkout`] and the
//! buyer [`dashboard`] figures.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod session;
pub mod state;

pub use config::{ConfigError, StorefrontConfig};
pub use error::{ApiError, CartError, CheckoutError, Result};
pub use state::AppState;
