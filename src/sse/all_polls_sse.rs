use crate::polls::PollResponse;
use crate::sse::models::SseEvent;
use crate::startup::AppState;
use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde_json::json;
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

pub async fn all_polls_sse(
    Extension(app_state): Extension<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.sse_tx.subscribe();

    let stream = async_stream::stream! {
        match app_state.store.list_polls().await {
            Ok(polls) => {
                let polls: Vec<PollResponse> = polls.into_iter().map(PollResponse::from).collect();
                yield Ok(Event::default()
                    .event("init")
                    .data(json!({"polls": polls}).to_string()));
            }
            Err(_) => {
                yield Ok(Event::default()
                    .event("error")
                    .data(json!({"error": "Failed to load polls"}).to_string()));
            }
        }

        loop {
            let (event_name, poll_id, extra) = match rx.recv().await {
                Ok(SseEvent::PollCreated(created)) => (
                    "poll_created",
                    created.poll_id,
                    json!({"question": created.question}),
                ),
                Ok(SseEvent::VoteUpdate(update)) => (
                    "poll_updated",
                    update.poll_id,
                    json!({
                        "updatedOptionId": update.option_id,
                        "newVoteCount": update.new_vote_count,
                    }),
                ),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "poll list subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Ok(Some(poll)) = app_state.store.get_poll(poll_id).await {
                let total_votes = poll.total_votes();
                yield Ok(Event::default()
                    .event(event_name)
                    .data(json!({
                        "poll": PollResponse::from(poll),
                        "pollId": poll_id,
                        "totalVotes": total_votes,
                        "change": extra,
                    }).to_string()));
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}
