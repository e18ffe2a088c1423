use axum::Router;

use crate::state::SharedState;

pub mod answers;
pub mod challenges;
pub mod docs;
pub mod health;
pub mod leaderboard;
pub mod participants;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(answers::router())
        .merge(challenges::router())
        .merge(leaderboard::router())
        .merge(participants::router())
        .merge(websocket::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
