use crate::db::{PollDetails, PollOption, VoteOutcome};
use crate::error::PollError;
use crate::identity::VoterIdentity;
use crate::sse::{PollCreated, PollUpdate, SseEvent};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{
        Extension, Json, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const MIN_OPTIONS: usize = 2;

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOptionRequest {
    #[serde(default)]
    pub text: String,
}

impl CreatePollRequest {
    /// Trims the question and option texts and checks them against the
    /// creation rules, returning what should be stored.
    pub fn validate(self) -> Result<(String, Vec<String>), PollError> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(PollError::InvalidRequest("question is required".to_string()));
        }

        let options: Vec<String> = self
            .options
            .into_iter()
            .map(|o| o.text.trim().to_string())
            .collect();

        if options.len() < MIN_OPTIONS {
            return Err(PollError::InvalidRequest(format!(
                "a poll needs at least {MIN_OPTIONS} options"
            )));
        }
        if let Some(position) = options.iter().position(|text| text.is_empty()) {
            return Err(PollError::InvalidRequest(format!(
                "option {} has no text",
                position + 1
            )));
        }

        Ok((question, options))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: i32,
    pub question: String,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}

impl From<PollDetails> for PollResponse {
    fn from(details: PollDetails) -> Self {
        PollResponse {
            id: details.poll.id,
            question: details.poll.question,
            created_at: details.poll.created_at,
            options: details.options,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VoteParams {
    #[serde(rename = "optionId")]
    pub option_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResultsResponse {
    pub poll_id: i32,
    pub question: String,
    pub total_votes: i64,
    pub has_voted: bool,
    pub results: Vec<OptionResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: i32,
    pub text: String,
    pub votes: i32,
    pub percentage: f64,
}

/// Share of `votes` in `total`, in percent with one decimal.
pub fn percentage(votes: i32, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (f64::from(votes) / total as f64 * 1000.0).round() / 10.0
}

/// Get all polls
pub async fn list_polls(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, PollError> {
    let polls = app_state.store.list_polls().await?;

    let poll_responses: Vec<PollResponse> = polls.into_iter().map(PollResponse::from).collect();

    Ok((StatusCode::OK, Json(poll_responses)))
}

/// Get a specific poll with all its options and vote counts
pub async fn get_poll(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<i32>,
) -> Result<impl IntoResponse, PollError> {
    let poll = app_state
        .store
        .get_poll(poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    Ok((StatusCode::OK, Json(PollResponse::from(poll))))
}

/// Create a new poll; responds with the stored poll and its location
pub async fn create_poll(
    Extension(app_state): Extension<AppState>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PollError> {
    let Json(payload) = payload.map_err(|e| PollError::InvalidRequest(e.body_text()))?;
    let (question, options) = payload.validate()?;

    let created = app_state.store.create_poll(&question, &options).await?;
    let poll_id = created.poll.id;
    info!(poll_id, options = created.options.len(), "poll created");

    let _ = app_state.sse_tx.send(SseEvent::PollCreated(PollCreated {
        poll_id,
        question: created.poll.question.clone(),
    }));

    let location = format!("/api/poll/{poll_id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PollResponse::from(created)),
    ))
}

/// Cast a vote on a poll option, once per voter identity
pub async fn vote_on_poll(
    Extension(app_state): Extension<AppState>,
    voter: VoterIdentity,
    Path(poll_id): Path<i32>,
    query: Result<Query<VoteParams>, QueryRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, PollError> {
    let option_id = resolve_option_id(query, &body)?;

    match app_state
        .store
        .cast_vote(poll_id, option_id, voter.as_str())
        .await?
    {
        VoteOutcome::Recorded { new_vote_count } => {
            info!(poll_id, option_id, new_vote_count, "vote recorded");
            let _ = app_state.sse_tx.send(SseEvent::VoteUpdate(PollUpdate {
                poll_id,
                option_id,
                new_vote_count,
            }));
            Ok(StatusCode::NO_CONTENT)
        }
        VoteOutcome::AlreadyVoted => {
            warn!(poll_id, voter = voter.as_str(), "duplicate vote rejected");
            Err(PollError::AlreadyVoted)
        }
        VoteOutcome::OptionNotFound => Err(PollError::OptionNotFound),
    }
}

/// `optionId` may arrive in the query string or as a JSON body; the query wins.
fn resolve_option_id(
    query: Result<Query<VoteParams>, QueryRejection>,
    body: &[u8],
) -> Result<i32, PollError> {
    let Query(params) = query.map_err(|e| PollError::InvalidRequest(e.body_text()))?;
    if let Some(option_id) = params.option_id {
        return Ok(option_id);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PollError::InvalidRequest("optionId is required".to_string()));
    }

    let params: VoteParams = serde_json::from_slice(body)
        .map_err(|e| PollError::InvalidRequest(format!("malformed vote body: {e}")))?;
    params
        .option_id
        .ok_or_else(|| PollError::InvalidRequest("optionId is required".to_string()))
}

/// Bar chart data for one poll
pub async fn poll_results(
    Extension(app_state): Extension<AppState>,
    voter: VoterIdentity,
    Path(poll_id): Path<i32>,
) -> Result<impl IntoResponse, PollError> {
    let poll = app_state
        .store
        .get_poll(poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;
    let has_voted = app_state.store.has_voted(poll_id, voter.as_str()).await?;

    let total_votes = poll.total_votes();
    let results = poll
        .options
        .into_iter()
        .map(|opt| OptionResult {
            option_id: opt.id,
            percentage: percentage(opt.votes, total_votes),
            text: opt.text,
            votes: opt.votes,
        })
        .collect();

    Ok(Json(PollResultsResponse {
        poll_id,
        question: poll.poll.question,
        total_votes,
        has_voted,
        results,
    }))
}
