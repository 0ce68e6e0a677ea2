//! SQLite backend for the vigil version store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That single connection thread also
//! serialises every operation, which is what makes each one atomic with
//! respect to concurrent callers.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
