//! Jhytermax admin library.
//!
//! Catalog, category and order management for marketplace administrators.
//! Access goes through [`AdminConsole::connect`], which checks the signed-in
//! user against the admin union (admin role, staff flag or superuser flag)
//! before handing out a console.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod console;
pub mod inventory;

pub use console::AdminConsole;
pub use inventory::{InventorySummary, LOW_STOCK_THRESHOLD};
