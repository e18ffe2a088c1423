use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::stat_store::StatStore,
    dto::leaderboard::{LeaderboardResponse, ParticipantStatsRequest, ParticipantStatsResponse},
    error::ServiceError,
    state::{
        SharedState,
        leaderboard::{LeaderboardEntry, rank_entries},
    },
};

/// One-shot leaderboard pull.
///
/// An explicit challenge id must exist; without one the active challenge is
/// ranked. No active challenge yields an empty board, not an error.
pub async fn leaderboard(
    state: &SharedState,
    challenge_id: Option<Uuid>,
) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_stat_store().await?;

    let challenge = match challenge_id {
        Some(id) => Some(store.find_challenge(id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("challenge `{id}` not found"))
        })?),
        None => store.active_challenge().await?,
    };
    let Some(challenge) = challenge else {
        return Ok(LeaderboardResponse {
            challenge_id: None,
            leaderboard: Vec::new(),
        });
    };

    let entries = challenge_entries(store.as_ref(), challenge.id).await?;
    Ok(LeaderboardResponse {
        challenge_id: Some(challenge.id),
        leaderboard: entries.into_iter().map(Into::into).collect(),
    })
}

/// Compute the ranked board for one challenge from its raw answer facts.
///
/// Only participants with at least one recorded answer appear.
pub(crate) async fn challenge_entries(
    store: &dyn StatStore,
    challenge_id: Uuid,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let stats = store.stats_for_challenge(challenge_id).await?;

    let mut ids: Vec<Uuid> = stats.iter().map(|stat| stat.participant_id).collect();
    ids.sort();
    ids.dedup();

    let participants = store.participants_by_ids(ids).await?;
    Ok(rank_entries(participants, &stats))
}

/// Ad-hoc all-history aggregation for an explicit participant set.
///
/// Same aggregation and ordering rules as the challenge board, with the
/// challenge filter simply omitted; requested participants without any
/// answers appear with zeroed counts.
pub async fn participant_stats(
    state: &SharedState,
    request: ParticipantStatsRequest,
) -> Result<ParticipantStatsResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_stat_store().await?;
    let participants = store
        .participants_by_ids(request.participant_ids.clone())
        .await?;
    let stats = store
        .stats_for_participants(request.participant_ids)
        .await?;

    Ok(ParticipantStatsResponse {
        leaderboard: rank_entries(participants, &stats)
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{AnswerStatEntity, ChallengeEntity},
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
        time: f64,
    ) {
        store
            .insert_answer_stat(AnswerStatEntity {
                id: Uuid::new_v4(),
                participant_id,
                challenge_id,
                question_id: 1,
                correct,
                time_taken_seconds: time,
                recorded_at: SystemTime::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_active_challenge_yields_an_empty_board() {
        let (state, _store) = test_state().await;
        let response = leaderboard(&state, None).await.unwrap();
        assert!(response.challenge_id.is_none());
        assert!(response.leaderboard.is_empty());
    }

    #[tokio::test]
    async fn unknown_explicit_challenge_is_an_error() {
        let (state, _store) = test_state().await;
        let err = leaderboard(&state, Some(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn accuracy_tie_is_broken_by_speed() {
        let (state, store) = test_state().await;
        let challenge = ChallengeEntity::new("finals".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();

        let a = store.seed_participant_with_code("AAAA1111", "A", true);
        let b = store.seed_participant_with_code("BBBB2222", "B", true);
        // Both answer three questions with two correct; B is faster overall.
        for (correct, time) in [(true, 4.0), (true, 3.0), (false, 3.0)] {
            record(&store, a.id, Some(challenge.id), correct, time).await;
        }
        for (correct, time) in [(true, 3.0), (true, 2.0), (false, 3.0)] {
            record(&store, b.id, Some(challenge.id), correct, time).await;
        }

        let response = leaderboard(&state, None).await.unwrap();
        assert_eq!(response.challenge_id, Some(challenge.id));
        let board = &response.leaderboard;
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].participant_id, b.id);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].total_time, 8.0);
        assert_eq!(board[1].participant_id, a.id);
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[1].total_time, 10.0);
    }

    #[tokio::test]
    async fn board_is_scoped_to_the_requested_challenge() {
        let (state, store) = test_state().await;
        let old = ChallengeEntity::new("old".to_string());
        store.start_challenge(old.clone()).await.unwrap();
        let a = store.seed_participant_with_code("AAAA1111", "A", true);
        record(&store, a.id, Some(old.id), true, 1.0).await;

        let current = ChallengeEntity::new("current".to_string());
        store.start_challenge(current.clone()).await.unwrap();

        let active_board = leaderboard(&state, None).await.unwrap();
        assert!(active_board.leaderboard.is_empty());

        let historical = leaderboard(&state, Some(old.id)).await.unwrap();
        assert_eq!(historical.leaderboard.len(), 1);
        assert_eq!(historical.leaderboard[0].total_correct, 1);
    }

    #[tokio::test]
    async fn participant_stats_span_all_history_and_include_idle_players() {
        let (state, store) = test_state().await;
        let challenge = ChallengeEntity::new("round".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();

        let a = store.seed_participant_with_code("AAAA1111", "A", true);
        let idle = store.seed_participant_with_code("BBBB2222", "B", true);
        record(&store, a.id, Some(challenge.id), true, 2.0).await;
        record(&store, a.id, None, true, 3.0).await;

        let response = participant_stats(
            &state,
            ParticipantStatsRequest {
                participant_ids: vec![a.id, idle.id],
            },
        )
        .await
        .unwrap();

        assert_eq!(response.leaderboard.len(), 2);
        let top = &response.leaderboard[0];
        assert_eq!(top.participant_id, a.id);
        assert_eq!(top.total_answered, 2);
        assert_eq!(top.total_correct, 2);
        let bottom = &response.leaderboard[1];
        assert_eq!(bottom.participant_id, idle.id);
        assert_eq!(bottom.total_answered, 0);
        assert_eq!(bottom.rank, 2);
    }

    #[tokio::test]
    async fn empty_participant_set_is_rejected() {
        let (state, _store) = test_state().await;
        let err = participant_stats(
            &state,
            ParticipantStatsRequest {
                participant_ids: Vec::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
