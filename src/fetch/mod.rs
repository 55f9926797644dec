//! Asset retrieval
//!
//! This module contains:
//! - The HTTP fetcher with rate-limit retry
//! - Media type inference used to build `data:` URIs

mod fetcher;
pub mod mime;

pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use mime::{DataType, MediaType};
pub use crate::FetchError;
