use crate::db::models::{Poll, PollDetails, PollOption, VoteOutcome};
use crate::db::store::{PollStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    polls: Vec<Poll>,
    options: Vec<PollOption>,
    /// `(poll_id, voter)` pairs, the in-memory counterpart of `UNIQUE(poll_id, voter_ip)`.
    votes: HashSet<(i32, String)>,
    next_poll_id: i32,
    next_option_id: i32,
}

impl Tables {
    fn details(&self, poll: &Poll) -> PollDetails {
        PollDetails {
            poll: poll.clone(),
            options: self
                .options
                .iter()
                .filter(|o| o.poll_id == poll.id)
                .cloned()
                .collect(),
        }
    }
}

/// In-process [`PollStore`] used by tests and `POLL_STORE=memory` runs.
///
/// Every operation takes the single table lock, so `cast_vote` is atomic in
/// the same way the Postgres transaction is.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with [`StoreError::Unavailable`] until flipped back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn list_polls(&self) -> Result<Vec<PollDetails>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.polls.iter().map(|p| tables.details(p)).collect())
    }

    async fn get_poll(&self, poll_id: i32) -> Result<Option<PollDetails>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .polls
            .iter()
            .find(|p| p.id == poll_id)
            .map(|p| tables.details(p)))
    }

    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<PollDetails, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().await;

        tables.next_poll_id += 1;
        let poll = Poll {
            id: tables.next_poll_id,
            question: question.to_string(),
            created_at: Utc::now(),
        };

        let mut created = Vec::with_capacity(options.len());
        for text in options {
            tables.next_option_id += 1;
            created.push(PollOption {
                id: tables.next_option_id,
                poll_id: poll.id,
                text: text.clone(),
                votes: 0,
            });
        }

        tables.polls.push(poll.clone());
        tables.options.extend(created.iter().cloned());

        Ok(PollDetails {
            poll,
            options: created,
        })
    }

    async fn cast_vote(
        &self,
        poll_id: i32,
        option_id: i32,
        voter: &str,
    ) -> Result<VoteOutcome, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().await;

        let Some(index) = tables
            .options
            .iter()
            .position(|o| o.id == option_id && o.poll_id == poll_id)
        else {
            return Ok(VoteOutcome::OptionNotFound);
        };

        if !tables.votes.insert((poll_id, voter.to_string())) {
            return Ok(VoteOutcome::AlreadyVoted);
        }

        let option = &mut tables.options[index];
        option.votes += 1;
        Ok(VoteOutcome::Recorded {
            new_vote_count: option.votes,
        })
    }

    async fn has_voted(&self, poll_id: i32, voter: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().await;
        Ok(tables.votes.contains(&(poll_id, voter.to_string())))
    }

    async fn health(&self) -> Result<String, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().await;
        Ok(format!(
            "Memory store: polls={}, options={}, votes={}",
            tables.polls.len(),
            tables.options.len(),
            tables.votes.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn create_assigns_ids_and_zero_counts() {
        let store = MemoryStore::new();
        let created = store
            .create_poll("Color?", &texts(&["Red", "Blue"]))
            .await
            .unwrap();

        assert_eq!(created.poll.id, 1);
        assert_eq!(created.options.len(), 2);
        assert!(created.options.iter().all(|o| o.votes == 0));
        assert!(created.options.iter().all(|o| o.poll_id == created.poll.id));
        assert_ne!(created.options[0].id, created.options[1].id);
    }

    #[tokio::test]
    async fn vote_increments_only_the_chosen_option() {
        let store = MemoryStore::new();
        let created = store
            .create_poll("Color?", &texts(&["Red", "Blue"]))
            .await
            .unwrap();
        let red = created.options[0].id;

        let outcome = store.cast_vote(created.poll.id, red, "10.0.0.1").await.unwrap();
        assert_eq!(outcome, VoteOutcome::Recorded { new_vote_count: 1 });

        let poll = store.get_poll(created.poll.id).await.unwrap().unwrap();
        assert_eq!(poll.options[0].votes, 1);
        assert_eq!(poll.options[1].votes, 0);
        assert!(store.has_voted(created.poll.id, "10.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn second_vote_from_same_voter_is_rejected() {
        let store = MemoryStore::new();
        let created = store
            .create_poll("Color?", &texts(&["Red", "Blue"]))
            .await
            .unwrap();
        let (red, blue) = (created.options[0].id, created.options[1].id);

        store.cast_vote(created.poll.id, red, "10.0.0.1").await.unwrap();
        let again = store.cast_vote(created.poll.id, blue, "10.0.0.1").await.unwrap();
        assert_eq!(again, VoteOutcome::AlreadyVoted);

        let poll = store.get_poll(created.poll.id).await.unwrap().unwrap();
        assert_eq!(poll.total_votes(), 1);
    }

    #[tokio::test]
    async fn option_from_another_poll_is_not_found() {
        let store = MemoryStore::new();
        let first = store.create_poll("A?", &texts(&["a1", "a2"])).await.unwrap();
        let second = store.create_poll("B?", &texts(&["b1", "b2"])).await.unwrap();

        let outcome = store
            .cast_vote(first.poll.id, second.options[0].id, "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(outcome, VoteOutcome::OptionNotFound);
        assert!(!store.has_voted(first.poll.id, "10.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_duplicates_record_once() {
        let store = Arc::new(MemoryStore::new());
        let created = store
            .create_poll("Color?", &texts(&["Red", "Blue"]))
            .await
            .unwrap();
        let (poll_id, red) = (created.poll.id, created.options[0].id);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.cast_vote(poll_id, red, "10.0.0.9").await })
            })
            .collect();

        let mut recorded = 0;
        for handle in handles {
            if let VoteOutcome::Recorded { .. } = handle.await.unwrap().unwrap() {
                recorded += 1;
            }
        }
        assert_eq!(recorded, 1);

        let poll = store.get_poll(poll_id).await.unwrap().unwrap();
        assert_eq!(poll.options[0].votes, 1);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.list_polls().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_offline(false);
        assert!(store.health().await.is_ok());
    }
}
