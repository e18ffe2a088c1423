use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::leaderboard::LeaderboardEntryDto;

/// Text shown to viewers while no competitive round is running.
const NO_ACTIVE_CHALLENGE_NOTICE: &str = "No active challenge";

/// Messages pushed to a leaderboard viewer over the WebSocket.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LeaderboardOutboundMessage {
    /// Full snapshot of the current rankings, or the no-active-challenge notice.
    LeaderboardUpdate {
        /// Challenge the snapshot belongs to; `null` when none is active.
        challenge_id: Option<Uuid>,
        /// Ranked entries, best first; empty when no challenge is active.
        leaderboard: Vec<LeaderboardEntryDto>,
        /// Unix timestamp of the snapshot; omitted on notices.
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
        /// Human-readable notice; only present when there is nothing to rank.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Best-effort failure notice sent before the connection is closed.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl LeaderboardOutboundMessage {
    /// Build a snapshot message stamped with the current time.
    pub fn update(challenge_id: Uuid, leaderboard: Vec<LeaderboardEntryDto>) -> Self {
        Self::LeaderboardUpdate {
            challenge_id: Some(challenge_id),
            leaderboard,
            timestamp: Some(OffsetDateTime::now_utc().unix_timestamp()),
            message: None,
        }
    }

    /// Build the notice pushed while no challenge is active.
    pub fn no_active_challenge() -> Self {
        Self::LeaderboardUpdate {
            challenge_id: None,
            leaderboard: Vec::new(),
            timestamp: None,
            message: Some(NO_ACTIVE_CHALLENGE_NOTICE.to_string()),
        }
    }

    /// Build a failure notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
