use crate::polls::PollResponse;
use crate::sse::models::SseEvent;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde_json::json;
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

pub async fn poll_updates_sse(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<i32>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.sse_tx.subscribe();

    let stream = async_stream::stream! {
        match app_state.store.get_poll(poll_id).await {
            Ok(Some(poll)) => {
                let total_votes = poll.total_votes();
                yield Ok(Event::default()
                    .event("init")
                    .data(json!({
                        "poll": PollResponse::from(poll),
                        "totalVotes": total_votes,
                    }).to_string()));
            }
            Ok(None) => {
                yield Ok(Event::default()
                    .event("error")
                    .data(json!({"error": "Poll not found"}).to_string()));
                return;
            }
            Err(_) => {
                yield Ok(Event::default()
                    .event("error")
                    .data(json!({"error": "Database error"}).to_string()));
                return;
            }
        }

        loop {
            match rx.recv().await {
                Ok(SseEvent::VoteUpdate(update)) if update.poll_id == poll_id => {
                    // A failed reload only drops this update; the next one carries full counts.
                    if let Ok(Some(poll)) = app_state.store.get_poll(poll_id).await {
                        let total_votes = poll.total_votes();
                        yield Ok(Event::default()
                            .event("vote_update")
                            .data(json!({
                                "options": poll.options,
                                "totalVotes": total_votes,
                                "updatedOptionId": update.option_id,
                            }).to_string()));
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(poll_id, skipped, "poll subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}
