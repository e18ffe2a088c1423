use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Arena Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::answers::submit_answer,
        crate::routes::answers::submit_bulk_answers,
        crate::routes::challenges::start_challenge,
        crate::routes::challenges::list_challenges,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::leaderboard::participant_stats,
        crate::routes::participants::session_progress,
        crate::routes::participants::game_stats,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::SubmitAnswerResponse,
            crate::dto::answer::BulkAnswersRequest,
            crate::dto::answer::BulkAnswersResponse,
            crate::dto::answer::GameAnswers,
            crate::dto::answer::DragDropAnswer,
            crate::dto::answer::JigsawAnswer,
            crate::dto::answer::GenericAnswer,
            crate::dto::answer::SessionSummary,
            crate::dto::challenge::StartChallengeRequest,
            crate::dto::challenge::ChallengeSummary,
            crate::dto::challenge::ChallengeList,
            crate::dto::leaderboard::LeaderboardEntryDto,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::ParticipantStatsRequest,
            crate::dto::leaderboard::ParticipantStatsResponse,
            crate::dto::participant::SessionProgressResponse,
            crate::dto::participant::ParticipantGameStatsResponse,
            crate::dto::ws::LeaderboardOutboundMessage,
            crate::dao::models::GameKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "answers", description = "Answer recording operations"),
        (name = "challenges", description = "Challenge lifecycle operations"),
        (name = "leaderboard", description = "Ranking queries"),
        (name = "participants", description = "Participant progress and statistics"),
        (name = "stream", description = "WebSocket leaderboard stream"),
    )
)]
pub struct ApiDoc;
