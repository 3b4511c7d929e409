//! Access to the remote forecast feed
//!
//! - `http`: downloading documents
//! - `url`: building and decomposing yr.no place URLs
//! - `parser`: turning a `weatherdata` document into models

use async_trait::async_trait;
use std::time::Duration;

use crate::Result;

pub mod http;
pub mod parser;
pub mod url;

pub use http::HttpFetcher;
pub use parser::{ParsedFeed, parse_forecast};

/// Downloads a raw document. Failures and timeouts are `Transport` errors.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}
