use crate::sse::models::SseEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 100;

pub fn create_sse_broadcaster() -> broadcast::Sender<SseEvent> {
    let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
    tx
}
