//! Warehouse façade
//!
//! Credentials come from a caller-named environment variable (see
//! [`creds`]); execution is one statement per call over a scoped,
//! TLS-required connection.

pub mod client;
pub mod creds;

// Re-export commonly used items
pub use client::{execute_sql, get_connection, read_sql, QueryOutput};
pub use creds::RedshiftCreds;
