use crate::db::models::{PollDetails, VoteOutcome};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for polls, options and vote records.
///
/// `cast_vote` is the only write path for option counters. Implementations
/// must perform the ownership check, the per-identity dedup and the increment
/// as one atomic unit: two concurrent calls with the same `(poll_id, voter)`
/// yield exactly one `Recorded`.
#[async_trait]
pub trait PollStore: Send + Sync + 'static {
    async fn list_polls(&self) -> Result<Vec<PollDetails>, StoreError>;

    async fn get_poll(&self, poll_id: i32) -> Result<Option<PollDetails>, StoreError>;

    /// Persists the poll and its options together, stamping `created_at`.
    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<PollDetails, StoreError>;

    async fn cast_vote(
        &self,
        poll_id: i32,
        option_id: i32,
        voter: &str,
    ) -> Result<VoteOutcome, StoreError>;

    async fn has_voted(&self, poll_id: i32, voter: &str) -> Result<bool, StoreError>;

    /// Short human-readable status line; errors when the backend is unreachable.
    async fn health(&self) -> Result<String, StoreError>;
}
