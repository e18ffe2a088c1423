use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dao::models::{GameKind, GameSessionEntity};

/// Payload for recording one participant's answer to one question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Participant code; matched case-insensitively.
    pub participant_code: String,
    /// Question identifier from the quiz client.
    pub question_id: i64,
    /// The submitted answer text.
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub answer: String,
    /// Elapsed time for this answer, in seconds.
    #[validate(range(min = 0.0, message = "time taken must not be negative"))]
    pub time_taken_seconds: f64,
    /// Explicit challenge to score under; defaults to the active challenge.
    #[serde(default)]
    pub challenge_id: Option<Uuid>,
}

/// Result of a single answer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// Whether the submitted answer matched the stored one.
    pub correct: bool,
}

/// Payload for submitting a whole game's worth of answers at once.
///
/// The `game_type` tag selects the answer shape; each variant carries its own
/// structured fields instead of an untyped key/value bag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAnswersRequest {
    /// Participant code; matched case-insensitively.
    pub participant_code: String,
    /// Tagged per-game answer list.
    #[serde(flatten)]
    pub game: GameAnswers,
    /// Declared duration of the whole game; summed from the answers when omitted.
    #[serde(default)]
    pub total_time_seconds: Option<f64>,
}

/// Game-specific answer lists, tagged by game type on the wire.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "game_type", content = "answers", rename_all = "snake_case")]
pub enum GameAnswers {
    /// Items dragged onto target slots.
    DragDrop(Vec<DragDropAnswer>),
    /// Picture pieces placed on a board.
    Jigsaw(Vec<JigsawAnswer>),
    /// Plain question/answer pairs.
    Generic(Vec<GenericAnswer>),
}

impl GameAnswers {
    /// Which mini-game this payload belongs to.
    pub fn kind(&self) -> GameKind {
        match self {
            GameAnswers::DragDrop(_) => GameKind::DragDrop,
            GameAnswers::Jigsaw(_) => GameKind::Jigsaw,
            GameAnswers::Generic(_) => GameKind::Generic,
        }
    }

    /// Number of answers in the payload.
    pub fn len(&self) -> usize {
        match self {
            GameAnswers::DragDrop(answers) => answers.len(),
            GameAnswers::Jigsaw(answers) => answers.len(),
            GameAnswers::Generic(answers) => answers.len(),
        }
    }

    /// True when the payload carries no answers at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Validate for GameAnswers {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let nested: Result<(), ValidationErrors> = match self {
            GameAnswers::DragDrop(answers) => {
                answers.iter().try_for_each(|answer| answer.validate())
            }
            GameAnswers::Jigsaw(answers) => {
                answers.iter().try_for_each(|answer| answer.validate())
            }
            GameAnswers::Generic(answers) => {
                answers.iter().try_for_each(|answer| answer.validate())
            }
        };
        if let Err(nested_errors) = nested {
            errors.merge_self("answers", Err(nested_errors));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One drag-and-drop placement.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DragDropAnswer {
    /// Question identifier from the game client.
    pub question_id: i64,
    /// Item the player moved.
    #[validate(length(min = 1, message = "item must not be empty"))]
    pub item: String,
    /// Slot the item landed on.
    #[validate(length(min = 1, message = "slot must not be empty"))]
    pub slot: String,
    /// Slot the item belongs to.
    #[validate(length(min = 1, message = "expected slot must not be empty"))]
    pub expected_slot: String,
    /// Elapsed time for this placement, in seconds.
    #[serde(default)]
    #[validate(range(min = 0.0, message = "time taken must not be negative"))]
    pub time_taken_seconds: f64,
}

impl DragDropAnswer {
    /// A placement is correct when the item landed on its expected slot.
    pub fn is_correct(&self) -> bool {
        self.slot == self.expected_slot
    }
}

/// One completed jigsaw round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JigsawAnswer {
    /// Question identifier from the game client.
    pub question_id: i64,
    /// Number of pieces in the puzzle.
    #[validate(range(min = 1, message = "puzzle must have at least one piece"))]
    pub piece_count: u32,
    /// Pieces left outside their correct position.
    pub misplaced_pieces: u32,
    /// Elapsed time for the round, in seconds.
    #[serde(default)]
    #[validate(range(min = 0.0, message = "time taken must not be negative"))]
    pub time_taken_seconds: f64,
}

impl JigsawAnswer {
    /// A round is correct when every piece ended up in place.
    pub fn is_correct(&self) -> bool {
        self.misplaced_pieces == 0
    }
}

/// One plain question/answer pair scored by text comparison.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GenericAnswer {
    /// Question identifier from the game client.
    pub question_id: i64,
    /// Answer selected by the player.
    #[validate(length(min = 1, message = "submitted answer must not be empty"))]
    pub submitted_answer: String,
    /// Answer the game considers correct.
    #[validate(length(min = 1, message = "correct answer must not be empty"))]
    pub correct_answer: String,
    /// Elapsed time for this answer, in seconds.
    #[serde(default)]
    #[validate(range(min = 0.0, message = "time taken must not be negative"))]
    pub time_taken_seconds: f64,
}

/// Result of a bulk submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAnswersResponse {
    /// Number of answer facts persisted.
    pub saved_count: u32,
    /// Summary record written for the whole game.
    pub session: SessionSummary,
}

/// Projection of a stored game session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Identifier of the stored session record.
    pub session_id: Uuid,
    /// Which mini-game produced the session.
    pub game_type: GameKind,
    /// Number of questions in the submission.
    pub total_questions: u32,
    /// Number answered correctly.
    pub total_correct: u32,
    /// Total duration of the game, in seconds.
    pub total_time_seconds: f64,
    /// Whether the game ran to completion.
    pub completed: bool,
    /// Share of correct answers, as a percentage.
    pub score_percentage: f64,
}

impl From<&GameSessionEntity> for SessionSummary {
    fn from(value: &GameSessionEntity) -> Self {
        Self {
            session_id: value.id,
            game_type: value.game,
            total_questions: value.total_questions,
            total_correct: value.total_correct,
            total_time_seconds: value.total_time_seconds,
            completed: value.completed,
            score_percentage: value.score_percentage(),
        }
    }
}
