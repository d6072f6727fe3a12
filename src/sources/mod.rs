mod fundgrube;

pub use fundgrube::FundgrubeApi;

use async_trait::async_trait;

use crate::config::Filter;
use crate::error::RunError;
use crate::models::Posting;

/// Seam to one listing endpoint: fetch the postings matching a filter from
/// the endpoint rooted at `base_url`. Swapped for a fake in orchestrator
/// tests.
#[async_trait]
pub trait PostingSource: Send + Sync {
    async fn fetch(&self, filter: &Filter, base_url: &str) -> Result<Vec<Posting>, RunError>;
}
