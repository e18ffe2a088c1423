use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::participant::{GameStatsQuery, ParticipantGameStatsResponse, SessionProgressResponse},
    error::AppError,
    services::participant_service,
    state::SharedState,
};

/// Routes exposing per-participant progress and statistics.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/participants/{code}/session", get(session_progress))
        .route("/participants/{code}/stats", get(game_stats))
}

/// Report a participant's progress within the active challenge.
#[utoipa::path(
    get,
    path = "/participants/{code}/session",
    tag = "participants",
    params(("code" = String, Path, description = "Participant code")),
    responses(
        (status = 200, description = "Active-challenge progress", body = SessionProgressResponse),
        (status = 400, description = "No active challenge"),
        (status = 404, description = "Participant not found")
    )
)]
pub async fn session_progress(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<SessionProgressResponse>, AppError> {
    let response = participant_service::session_progress(&state, &code).await?;
    Ok(Json(response))
}

/// Report a participant's aggregate game statistics.
#[utoipa::path(
    get,
    path = "/participants/{code}/stats",
    tag = "participants",
    params(
        ("code" = String, Path, description = "Participant code"),
        GameStatsQuery
    ),
    responses(
        (status = 200, description = "Aggregate statistics", body = ParticipantGameStatsResponse),
        (status = 404, description = "Participant not found")
    )
)]
pub async fn game_stats(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<GameStatsQuery>,
) -> Result<Json<ParticipantGameStatsResponse>, AppError> {
    let response = participant_service::game_stats(&state, &code, query.game).await?;
    Ok(Json(response))
}
