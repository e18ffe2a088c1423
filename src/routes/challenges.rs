use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::challenge::{ChallengeList, ChallengeSummary, StartChallengeRequest},
    error::AppError,
    services::challenge_service,
    state::SharedState,
};

/// Routes handling the challenge lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new().route("/challenges", post(start_challenge).get(list_challenges))
}

/// Start a new challenge, superseding any active one.
#[utoipa::path(
    post,
    path = "/challenges",
    tag = "challenges",
    request_body = StartChallengeRequest,
    responses(
        (status = 200, description = "Challenge started", body = ChallengeSummary),
        (status = 400, description = "Invalid challenge name")
    )
)]
pub async fn start_challenge(
    State(state): State<SharedState>,
    Json(payload): Json<StartChallengeRequest>,
) -> Result<Json<ChallengeSummary>, AppError> {
    let summary = challenge_service::start_challenge(&state, payload).await?;
    Ok(Json(summary))
}

/// List all challenges, most recently started first.
#[utoipa::path(
    get,
    path = "/challenges",
    tag = "challenges",
    responses((status = 200, description = "Challenge history", body = ChallengeList))
)]
pub async fn list_challenges(
    State(state): State<SharedState>,
) -> Result<Json<ChallengeList>, AppError> {
    let list = challenge_service::list_challenges(&state).await?;
    Ok(Json(list))
}
