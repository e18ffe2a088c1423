use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dao::models::GameKind;

/// A participant's progress within the currently active challenge.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionProgressResponse {
    /// Identifier of the active challenge.
    pub challenge_id: Uuid,
    /// Name of the active challenge.
    pub challenge_name: String,
    /// Index of the question the participant is on.
    pub current_question: u32,
    /// Answers recorded so far.
    pub total_answered: u32,
    /// Correct answers so far.
    pub total_correct: u32,
    /// Incorrect answers so far.
    pub total_failed: u32,
}

/// Aggregate game statistics for one participant.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantGameStatsResponse {
    /// Display name of the participant.
    pub participant_name: String,
    /// Completed game sessions, within the optional kind filter.
    pub total_games: u32,
    /// Answer facts across all history.
    pub total_answers: u32,
    /// Correct answers across all history.
    pub total_correct: u32,
    /// Correct share as a percentage, rounded to two decimals.
    pub accuracy_percentage: f64,
}

/// Query parameters accepted by the participant stats endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameStatsQuery {
    /// Restrict the session count to one game kind.
    pub game: Option<GameKind>,
}
