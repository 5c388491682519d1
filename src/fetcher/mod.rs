pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

/// Raw transport used by the content source.
///
/// Implementations map a missing resource (HTTP 404) to
/// [`SwipediaError::NotFound`](crate::app::SwipediaError::NotFound) and any
/// other failure to a network error.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
