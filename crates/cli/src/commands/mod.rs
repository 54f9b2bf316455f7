//! Command implementations. Results are reported through `tracing`.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod payments;

/// Outcome of a command; errors are reported once by `main`.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
