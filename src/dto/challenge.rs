use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::ChallengeEntity, dto::format_system_time};

/// Payload used to open a new competitive round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartChallengeRequest {
    /// Display name of the round.
    #[validate(length(min = 1, max = 120, message = "name must be 1 to 120 characters"))]
    pub name: String,
}

/// Public projection of a challenge.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeSummary {
    /// Identifier of the challenge.
    pub challenge_id: Uuid,
    /// Display name of the round.
    pub name: String,
    /// Whether this is the single active challenge.
    pub active: bool,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 end timestamp; `null` while active.
    pub ended_at: Option<String>,
}

impl From<ChallengeEntity> for ChallengeSummary {
    fn from(value: ChallengeEntity) -> Self {
        Self {
            challenge_id: value.id,
            name: value.name,
            active: value.active,
            started_at: format_system_time(value.started_at),
            ended_at: value.ended_at.map(format_system_time),
        }
    }
}

/// Challenge history, most recently started first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeList {
    /// The challenges, newest first.
    pub challenges: Vec<ChallengeSummary>,
}
