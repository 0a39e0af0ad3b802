//! Persistence layer: the local key-value store holding the auth token.

pub mod libsql_backend;
mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlTokenStore;
pub use traits::{TOKEN_KEY, TokenStore};
