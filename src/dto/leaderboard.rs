use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::state::leaderboard::LeaderboardEntry;

/// Public projection of one ranking row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    /// Stable identifier of the participant.
    pub participant_id: Uuid,
    /// Participant's short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Number of answers aggregated.
    pub total_answered: u32,
    /// Number of correct answers.
    pub total_correct: u32,
    /// Total elapsed time in seconds, rounded to two decimals.
    pub total_time: f64,
    /// 1-based rank.
    pub rank: u32,
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(value: LeaderboardEntry) -> Self {
        Self {
            participant_id: value.participant_id,
            code: value.code,
            name: value.name,
            total_answered: value.total_answered,
            total_correct: value.total_correct,
            total_time: value.total_time,
            rank: value.rank,
        }
    }
}

/// One-shot pull response for non-streaming clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Challenge the board was computed for; `null` when none is active.
    pub challenge_id: Option<Uuid>,
    /// Ranked entries, best first.
    pub leaderboard: Vec<LeaderboardEntryDto>,
}

/// Query parameters accepted by the pull endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Explicit challenge to rank; defaults to the active one.
    pub challenge_id: Option<Uuid>,
}

/// Ad-hoc all-history stats request for an explicit participant set.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ParticipantStatsRequest {
    /// Participants to aggregate; unknown ids are skipped.
    #[validate(length(min = 1, message = "participant_ids must not be empty"))]
    pub participant_ids: Vec<Uuid>,
}

/// Ranked all-history stats for the requested participants.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantStatsResponse {
    /// Ranked entries, best first.
    pub leaderboard: Vec<LeaderboardEntryDto>,
}
