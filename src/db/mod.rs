//! Database module for uptrail.
//!
//! Provides the SQLite request log with embedded migrations.

mod models;
mod store;

pub use models::*;
pub use store::*;
