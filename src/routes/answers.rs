use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::answer::{
        BulkAnswersRequest, BulkAnswersResponse, SubmitAnswerRequest, SubmitAnswerResponse,
    },
    error::AppError,
    services::answer_service,
    state::SharedState,
};

/// Routes handling answer recording operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/answers", post(submit_answer))
        .route("/answers/bulk", post(submit_bulk_answers))
}

/// Record one answer and report whether it was correct.
#[utoipa::path(
    post,
    path = "/answers",
    tag = "answers",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Invalid input or no active challenge"),
        (status = 404, description = "Participant or challenge not found")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let response = answer_service::record_answer(&state, payload).await?;
    Ok(Json(response))
}

/// Record a whole game's worth of answers plus a session summary.
#[utoipa::path(
    post,
    path = "/answers/bulk",
    tag = "answers",
    request_body = BulkAnswersRequest,
    responses(
        (status = 200, description = "Answers recorded", body = BulkAnswersResponse),
        (status = 400, description = "Invalid game type or empty answer list"),
        (status = 404, description = "Participant not found")
    )
)]
pub async fn submit_bulk_answers(
    State(state): State<SharedState>,
    Json(payload): Json<BulkAnswersRequest>,
) -> Result<Json<BulkAnswersResponse>, AppError> {
    let response = answer_service::record_bulk_answers(&state, payload).await?;
    Ok(Json(response))
}
