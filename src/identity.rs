use crate::error::PollError;
use crate::startup::AppState;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::net::SocketAddr;

/// Who is casting a vote, as far as dedup is concerned.
///
/// Derived from the peer address of the connection, or from the first
/// `X-Forwarded-For` entry when the service runs behind a trusted proxy. This
/// is an anti-abuse heuristic, not authentication: clients sharing a NAT share
/// one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterIdentity(pub String);

impl VoterIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for VoterIdentity
where
    S: Send + Sync,
{
    type Rejection = PollError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let trust_forwarded = parts
            .extensions
            .get::<AppState>()
            .is_some_and(|state| state.config.trust_forwarded_for);

        if trust_forwarded {
            if let Some(forwarded) = forwarded_for(parts) {
                return Ok(VoterIdentity(forwarded));
            }
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| VoterIdentity(addr.ip().to_string()))
            .ok_or(PollError::UnknownVoter)
    }
}

fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .map(str::to_string)
}
