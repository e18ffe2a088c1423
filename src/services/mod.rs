/// Answer recording and correctness checking.
pub mod answer_service;
/// Per-connection leaderboard push loop.
pub mod broadcast_service;
/// Challenge lifecycle management.
pub mod challenge_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Participant progress and statistics queries.
pub mod participant_service;
/// Leaderboard computation queries.
pub mod ranking_service;
/// Storage persistence coordinator with reconnection backoff.
pub mod storage_supervisor;
