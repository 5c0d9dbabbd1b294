use crate::config::Config;
use crate::db::PollStore;
use crate::sse::{SseSender, create_sse_broadcaster};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PollStore>,
    pub sse_tx: SseSender,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PollStore>, config: Config) -> Self {
        AppState {
            store,
            sse_tx: create_sse_broadcaster(),
            config: Arc::new(config),
        }
    }
}
