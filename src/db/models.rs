use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: i32,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollOption {
    pub id: i32,
    pub text: String,
    pub votes: i32,
    #[serde(rename = "pollID")]
    pub poll_id: i32,
}

/// A poll together with its options, in creation order.
#[derive(Debug, Clone)]
pub struct PollDetails {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

impl PollDetails {
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|o| i64::from(o.votes)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded { new_vote_count: i32 },
    AlreadyVoted,
    OptionNotFound,
}
