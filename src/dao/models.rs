use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Registered player identity as read from the external account subsystem.
///
/// The core never creates or mutates participants; it only resolves codes and
/// checks the active flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Stable identifier for the participant.
    pub id: Uuid,
    /// Short human-readable code (8 uppercase alphanumeric characters).
    pub code: String,
    /// Display name chosen at registration.
    pub name: String,
    /// Whether the account is currently allowed to play.
    pub active: bool,
}

/// One time-bounded competitive round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeEntity {
    /// Primary key of the challenge.
    pub id: Uuid,
    /// Display name of the round.
    pub name: String,
    /// Whether this is the single globally active challenge.
    pub active: bool,
    /// When the round was opened.
    pub started_at: SystemTime,
    /// When the round was superseded; `None` while active.
    pub ended_at: Option<SystemTime>,
}

impl ChallengeEntity {
    /// Build a fresh active challenge with a new identifier.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            active: true,
            started_at: SystemTime::now(),
            ended_at: None,
        }
    }
}

/// Quiz question with its stored correct answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Question identifier used by the game clients.
    pub id: i64,
    /// Question text shown to players.
    pub text: String,
    /// Expected answer, compared after trimming and case folding.
    pub correct_answer: String,
}

/// Immutable fact: one participant answered one question.
///
/// Rows are append-only; scores are always derived by aggregation, never by
/// mutating counters in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerStatEntity {
    /// Primary key of the fact row.
    pub id: Uuid,
    /// Participant who answered.
    pub participant_id: Uuid,
    /// Challenge the answer was scored under; `None` for practice/bulk games.
    pub challenge_id: Option<Uuid>,
    /// Question identifier from the game client.
    pub question_id: i64,
    /// Whether the submitted answer matched the stored one.
    pub correct: bool,
    /// Elapsed time for this answer, in seconds.
    pub time_taken_seconds: f64,
    /// When the fact was recorded.
    pub recorded_at: SystemTime,
}

/// Kind of mini-game a bulk submission originates from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Drag items onto target slots.
    DragDrop,
    /// Assemble a picture from pieces.
    Jigsaw,
    /// Plain question/answer round.
    Generic,
}

impl GameKind {
    /// Wire name of the kind, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::DragDrop => "drag_drop",
            GameKind::Jigsaw => "jigsaw",
            GameKind::Generic => "generic",
        }
    }
}

/// Summary record written once per bulk game submission.
///
/// Convenience aggregate for reporting; the per-answer facts remain the
/// source of truth for rankings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSessionEntity {
    /// Primary key of the session record.
    pub id: Uuid,
    /// Participant who played the game.
    pub participant_id: Uuid,
    /// Which mini-game produced the session.
    pub game: GameKind,
    /// Number of questions in the submission.
    pub total_questions: u32,
    /// Number answered correctly.
    pub total_correct: u32,
    /// Declared or summed duration of the whole game.
    pub total_time_seconds: f64,
    /// Whether the game ran to completion.
    pub completed: bool,
    /// When the game finished.
    pub completed_at: SystemTime,
}

impl GameSessionEntity {
    /// Share of correct answers as a percentage, rounded to two decimals.
    pub fn score_percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let ratio = f64::from(self.total_correct) / f64::from(self.total_questions);
        (ratio * 100.0 * 100.0).round() / 100.0
    }
}
