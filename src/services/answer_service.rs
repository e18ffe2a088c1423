use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        models::{AnswerStatEntity, ChallengeEntity, GameSessionEntity, ParticipantEntity},
        stat_store::StatStore,
    },
    dto::{
        answer::{
            BulkAnswersRequest, BulkAnswersResponse, GameAnswers, SessionSummary,
            SubmitAnswerRequest, SubmitAnswerResponse,
        },
        validation::validate_participant_code,
    },
    error::ServiceError,
    state::SharedState,
};

/// Record one participant's answer to one question.
///
/// Correctness is determined server-side against the stored question; the
/// resulting fact row is immutable and appended exactly once.
pub async fn record_answer(
    state: &SharedState,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_stat_store().await?;
    let code = normalize_code(&request.participant_code)?;
    let participant = resolve_participant(store.as_ref(), &code).await?;
    let challenge = resolve_challenge(store.as_ref(), request.challenge_id).await?;

    let correct = check_answer(store.as_ref(), request.question_id, &request.answer).await?;
    store
        .insert_answer_stat(AnswerStatEntity {
            id: Uuid::new_v4(),
            participant_id: participant.id,
            challenge_id: Some(challenge.id),
            question_id: request.question_id,
            correct,
            time_taken_seconds: request.time_taken_seconds,
            recorded_at: SystemTime::now(),
        })
        .await?;

    info!(
        participant = %participant.code,
        challenge = %challenge.id,
        question = request.question_id,
        correct,
        "answer recorded"
    );

    Ok(SubmitAnswerResponse { correct })
}

/// Record a whole game's worth of answers plus one session summary.
///
/// The answer facts are challenge-less practice rows; the summary is a
/// reporting convenience, not a substitute for the per-answer facts.
pub async fn record_bulk_answers(
    state: &SharedState,
    request: BulkAnswersRequest,
) -> Result<BulkAnswersResponse, ServiceError> {
    if request.game.is_empty() {
        return Err(ServiceError::InvalidInput(
            "answer list must not be empty".into(),
        ));
    }
    request
        .game
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;
    if let Some(total) = request.total_time_seconds
        && total < 0.0
    {
        return Err(ServiceError::InvalidInput(
            "total time must not be negative".into(),
        ));
    }

    let store = state.require_stat_store().await?;
    let code = normalize_code(&request.participant_code)?;
    let participant = resolve_participant(store.as_ref(), &code).await?;

    let scored = score_answers(&request.game);
    let now = SystemTime::now();
    let stats: Vec<AnswerStatEntity> = scored
        .iter()
        .map(|answer| AnswerStatEntity {
            id: Uuid::new_v4(),
            participant_id: participant.id,
            challenge_id: None,
            question_id: answer.question_id,
            correct: answer.correct,
            time_taken_seconds: answer.time_taken_seconds,
            recorded_at: now,
        })
        .collect();

    let total_correct = scored.iter().filter(|answer| answer.correct).count() as u32;
    let summed_time: f64 = scored.iter().map(|answer| answer.time_taken_seconds).sum();
    let session = GameSessionEntity {
        id: Uuid::new_v4(),
        participant_id: participant.id,
        game: request.game.kind(),
        total_questions: scored.len() as u32,
        total_correct,
        total_time_seconds: request.total_time_seconds.unwrap_or(summed_time),
        completed: true,
        completed_at: now,
    };

    store.insert_answer_stats(stats).await?;
    store.insert_game_session(session.clone()).await?;

    info!(
        participant = %participant.code,
        game = request.game.kind().as_str(),
        saved = scored.len(),
        correct = total_correct,
        "bulk answers recorded"
    );

    Ok(BulkAnswersResponse {
        saved_count: scored.len() as u32,
        session: SessionSummary::from(&session),
    })
}

/// Normalize a client-supplied participant code and validate its shape.
pub(crate) fn normalize_code(raw: &str) -> Result<String, ServiceError> {
    let code = raw.trim().to_uppercase();
    validate_participant_code(&code).map_err(|err| {
        let message = err.message.clone().unwrap_or_else(|| err.code.clone());
        ServiceError::InvalidInput(message.into_owned())
    })?;
    Ok(code)
}

/// Resolve a normalized code to an active participant.
pub(crate) async fn resolve_participant(
    store: &dyn StatStore,
    code: &str,
) -> Result<ParticipantEntity, ServiceError> {
    store
        .find_participant(code.to_string())
        .await?
        .filter(|participant| participant.active)
        .ok_or_else(|| ServiceError::NotFound(format!("participant `{code}` not found")))
}

/// Resolve the challenge to score under: an explicit id must exist, otherwise
/// the currently active challenge is required.
async fn resolve_challenge(
    store: &dyn StatStore,
    challenge_id: Option<Uuid>,
) -> Result<ChallengeEntity, ServiceError> {
    match challenge_id {
        Some(id) => store
            .find_challenge(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("challenge `{id}` not found"))),
        None => store
            .active_challenge()
            .await?
            .ok_or(ServiceError::NoActiveChallenge),
    }
}

/// Check a submitted answer against the stored question.
///
/// Unknown question ids score as incorrect rather than failing the
/// submission.
async fn check_answer(
    store: &dyn StatStore,
    question_id: i64,
    answer: &str,
) -> Result<bool, ServiceError> {
    let Some(question) = store.find_question(question_id).await? else {
        return Ok(false);
    };
    Ok(answers_match(answer, &question.correct_answer))
}

/// Trimmed, case-folded answer comparison.
fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

struct ScoredAnswer {
    question_id: i64,
    correct: bool,
    time_taken_seconds: f64,
}

/// Derive correctness from each variant's structured fields.
fn score_answers(game: &GameAnswers) -> Vec<ScoredAnswer> {
    match game {
        GameAnswers::DragDrop(answers) => answers
            .iter()
            .map(|answer| ScoredAnswer {
                question_id: answer.question_id,
                correct: answer.is_correct(),
                time_taken_seconds: answer.time_taken_seconds,
            })
            .collect(),
        GameAnswers::Jigsaw(answers) => answers
            .iter()
            .map(|answer| ScoredAnswer {
                question_id: answer.question_id,
                correct: answer.is_correct(),
                time_taken_seconds: answer.time_taken_seconds,
            })
            .collect(),
        GameAnswers::Generic(answers) => answers
            .iter()
            .map(|answer| ScoredAnswer {
                question_id: answer.question_id,
                correct: answers_match(&answer.submitted_answer, &answer.correct_answer),
                time_taken_seconds: answer.time_taken_seconds,
            })
            .collect(),
    }
}
