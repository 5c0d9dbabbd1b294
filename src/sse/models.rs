#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub poll_id: i32,
    pub option_id: i32,
    pub new_vote_count: i32,
}

#[derive(Debug, Clone)]
pub struct PollCreated {
    pub poll_id: i32,
    pub question: String,
}

#[derive(Debug, Clone)]
pub enum SseEvent {
    VoteUpdate(PollUpdate),
    PollCreated(PollCreated),
}

pub type SseSender = tokio::sync::broadcast::Sender<SseEvent>;
