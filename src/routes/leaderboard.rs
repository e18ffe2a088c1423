use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::leaderboard::{
        LeaderboardQuery, LeaderboardResponse, ParticipantStatsRequest, ParticipantStatsResponse,
    },
    error::AppError,
    services::ranking_service,
    state::SharedState,
};

/// Routes serving one-shot ranking queries for non-streaming clients.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/stats", post(participant_stats))
}

/// Pull the current ranked board for a challenge.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Explicit challenge not found")
    )
)]
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = ranking_service::leaderboard(&state, query.challenge_id).await?;
    Ok(Json(response))
}

/// Aggregate all-history stats for an explicit participant set.
#[utoipa::path(
    post,
    path = "/leaderboard/stats",
    tag = "leaderboard",
    request_body = ParticipantStatsRequest,
    responses(
        (status = 200, description = "Ranked participant stats", body = ParticipantStatsResponse),
        (status = 400, description = "Empty participant set")
    )
)]
pub async fn participant_stats(
    State(state): State<SharedState>,
    Json(payload): Json<ParticipantStatsRequest>,
) -> Result<Json<ParticipantStatsResponse>, AppError> {
    let response = ranking_service::participant_stats(&state, payload).await?;
    Ok(Json(response))
}
