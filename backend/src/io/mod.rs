//! Outbound I/O: the REST backend client.

pub mod api_client;

pub use api_client::{ApiClient, ApiError};
