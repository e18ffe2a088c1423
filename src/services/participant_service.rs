use crate::{
    dao::{models::GameKind, stat_store::StatStore},
    dto::participant::{ParticipantGameStatsResponse, SessionProgressResponse},
    error::ServiceError,
    services::answer_service::{normalize_code, resolve_participant},
    state::SharedState,
};

/// A participant's progress within the currently active challenge.
pub async fn session_progress(
    state: &SharedState,
    raw_code: &str,
) -> Result<SessionProgressResponse, ServiceError> {
    let store = state.require_stat_store().await?;
    let code = normalize_code(raw_code)?;
    let participant = resolve_participant(store.as_ref(), &code).await?;
    let challenge = store
        .active_challenge()
        .await?
        .ok_or(ServiceError::NoActiveChallenge)?;

    let stats = store.stats_for_participants(vec![participant.id]).await?;
    let in_challenge: Vec<_> = stats
        .iter()
        .filter(|stat| stat.challenge_id == Some(challenge.id))
        .collect();
    let total_answered = in_challenge.len() as u32;
    let total_correct = in_challenge.iter().filter(|stat| stat.correct).count() as u32;

    Ok(SessionProgressResponse {
        challenge_id: challenge.id,
        challenge_name: challenge.name,
        current_question: total_answered,
        total_answered,
        total_correct,
        total_failed: total_answered - total_correct,
    })
}

/// Aggregate game statistics for one participant, optionally narrowed to one
/// game kind for the session count.
pub async fn game_stats(
    state: &SharedState,
    raw_code: &str,
    game: Option<GameKind>,
) -> Result<ParticipantGameStatsResponse, ServiceError> {
    let store = state.require_stat_store().await?;
    let code = normalize_code(raw_code)?;
    let participant = resolve_participant(store.as_ref(), &code).await?;

    let sessions = store
        .sessions_for_participant(participant.id, game)
        .await?;
    let stats = store.stats_for_participants(vec![participant.id]).await?;

    let total_answers = stats.len() as u32;
    let total_correct = stats.iter().filter(|stat| stat.correct).count() as u32;
    let accuracy_percentage = if total_answers > 0 {
        let ratio = f64::from(total_correct) / f64::from(total_answers);
        (ratio * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(ParticipantGameStatsResponse {
        participant_name: participant.name,
        total_games: sessions.len() as u32,
        total_answers,
        total_correct,
        accuracy_percentage,
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{AnswerStatEntity, ChallengeEntity, GameSessionEntity},
            stat_store::memory::MemoryStatStore,
        },
        state::AppState,
    };

    async fn test_state() -> (SharedState, MemoryStatStore) {
        let state = AppState::new(AppConfig::default());
        let store = MemoryStatStore::new();
        state.set_stat_store(Arc::new(store.clone())).await;
        (state, store)
    }

    async fn record(
        store: &MemoryStatStore,
        participant_id: Uuid,
        challenge_id: Option<Uuid>,
        correct: bool,
    ) {
        store
            .insert_answer_stat(AnswerStatEntity {
                id: Uuid::new_v4(),
                participant_id,
                challenge_id,
                question_id: 1,
                correct,
                time_taken_seconds: 1.0,
                recorded_at: SystemTime::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn progress_counts_only_the_active_challenge() {
        let (state, store) = test_state().await;
        let participant = store.seed_participant_with_code("AAAA1111", "Alice", true);

        let old = ChallengeEntity::new("old".to_string());
        store.start_challenge(old.clone()).await.unwrap();
        record(&store, participant.id, Some(old.id), true).await;

        let current = ChallengeEntity::new("current".to_string());
        store.start_challenge(current.clone()).await.unwrap();
        record(&store, participant.id, Some(current.id), true).await;
        record(&store, participant.id, Some(current.id), false).await;

        let progress = session_progress(&state, "AAAA1111").await.unwrap();
        assert_eq!(progress.challenge_id, current.id);
        assert_eq!(progress.total_answered, 2);
        assert_eq!(progress.total_correct, 1);
        assert_eq!(progress.total_failed, 1);
    }

    #[tokio::test]
    async fn progress_requires_an_active_challenge() {
        let (state, store) = test_state().await;
        store.seed_participant_with_code("AAAA1111", "Alice", true);

        let err = session_progress(&state, "AAAA1111").await.unwrap_err();
        assert!(matches!(err, ServiceError::NoActiveChallenge));
    }

    #[tokio::test]
    async fn game_stats_aggregate_accuracy_across_history() {
        let (state, store) = test_state().await;
        let participant = store.seed_participant_with_code("AAAA1111", "Alice", true);

        record(&store, participant.id, None, true).await;
        record(&store, participant.id, None, true).await;
        record(&store, participant.id, None, false).await;
        store
            .insert_game_session(GameSessionEntity {
                id: Uuid::new_v4(),
                participant_id: participant.id,
                game: GameKind::Generic,
                total_questions: 3,
                total_correct: 2,
                total_time_seconds: 9.0,
                completed: true,
                completed_at: SystemTime::now(),
            })
            .await
            .unwrap();

        let stats = game_stats(&state, "AAAA1111", None).await.unwrap();
        assert_eq!(stats.total_games, 1);
        assert_eq!(stats.total_answers, 3);
        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.accuracy_percentage, 66.67);

        let filtered = game_stats(&state, "AAAA1111", Some(GameKind::Jigsaw))
            .await
            .unwrap();
        assert_eq!(filtered.total_games, 0);
    }
}
