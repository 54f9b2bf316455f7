//! Jhytermax Core - Shared domain types.
//!
//! This crate provides the types used across all Jhytermax components:
//! - `storefront` - Session client, REST API wrapper, cart and checkout
//! - `admin` - Admin console over the catalog and order endpoints
//! - `cli` - Command-line front-end (`jx`)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no credential storage. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, email addresses, roles, statuses and Naira formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
