use crate::db::connection::{DbPool, get_pool_stats};
use crate::db::models::{PollDetails, VoteOutcome};
use crate::db::repositories;
use crate::db::store::{PollStore, StoreError};
use async_trait::async_trait;

/// PostgreSQL-backed [`PollStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgStore {
    async fn list_polls(&self) -> Result<Vec<PollDetails>, StoreError> {
        Ok(repositories::get_all_poll_details(&self.pool).await?)
    }

    async fn get_poll(&self, poll_id: i32) -> Result<Option<PollDetails>, StoreError> {
        let Some(poll) = repositories::get_poll(&self.pool, poll_id).await? else {
            return Ok(None);
        };
        let options = repositories::get_poll_options(&self.pool, poll_id).await?;
        Ok(Some(PollDetails { poll, options }))
    }

    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<PollDetails, StoreError> {
        Ok(repositories::create_poll(&self.pool, question, options).await?)
    }

    async fn cast_vote(
        &self,
        poll_id: i32,
        option_id: i32,
        voter: &str,
    ) -> Result<VoteOutcome, StoreError> {
        Ok(repositories::cast_vote(&self.pool, poll_id, option_id, voter).await?)
    }

    async fn has_voted(&self, poll_id: i32, voter: &str) -> Result<bool, StoreError> {
        Ok(repositories::user_has_voted(&self.pool, poll_id, voter).await?)
    }

    async fn health(&self) -> Result<String, StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(get_pool_stats(&self.pool))
    }
}
