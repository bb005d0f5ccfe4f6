//! REST client module for the hosted menu store.
//!
//! This module provides the `StoreClient`, which implements `MenuStore`
//! over HTTP. Requests authenticate with the project's anon key, sent both
//! as the `apikey` header and as a bearer token.

pub mod client;
pub mod error;

pub use client::StoreClient;
pub use error::ApiError;
