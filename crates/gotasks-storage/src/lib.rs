//! gotasks Storage Layer
//!
//! SQLite-backed key-value storage with two scopes:
//! - `Session`: cleared whenever the database is opened, so nothing in it
//!   survives a restart (CSRF state, access token, token expiry)
//! - `Local`: durable across restarts (logged-in flag, selected task list)

mod database;
mod error;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use store::{KeyValueStore, StorageScope};

pub type Result<T> = std::result::Result<T, StorageError>;
