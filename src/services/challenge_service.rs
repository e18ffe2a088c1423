use tracing::info;
use validator::Validate;

use crate::{
    dao::{models::ChallengeEntity, stat_store::StatStore},
    dto::challenge::{ChallengeList, ChallengeSummary, StartChallengeRequest},
    error::ServiceError,
    state::SharedState,
};

/// Open a new competitive round, superseding any currently active one.
///
/// Deactivating previous challenges and inserting the new one happen inside a
/// single atomic store operation, so readers never observe two active
/// challenges or none at all right after a successful start.
pub async fn start_challenge(
    state: &SharedState,
    request: StartChallengeRequest,
) -> Result<ChallengeSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "challenge name must not be empty".into(),
        ));
    }

    let store = state.require_stat_store().await?;
    let challenge = ChallengeEntity::new(name);
    store.start_challenge(challenge.clone()).await?;

    info!(id = %challenge.id, name = %challenge.name, "challenge started");
    Ok(challenge.into())
}

/// Full challenge history, most recently started first.
pub async fn list_challenges(state: &SharedState) -> Result<ChallengeList, ServiceError> {
    let store = state.require_stat_store().await?;
    let challenges = store.list_challenges().await?;
    Ok(ChallengeList {
        challenges: challenges.into_iter().map(Into::into).collect(),
    })
}

/// The single currently active challenge, if any.
pub async fn active_challenge(
    state: &SharedState,
) -> Result<Option<ChallengeEntity>, ServiceError> {
    let store = state.require_stat_store().await?;
    Ok(store.active_challenge().await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::stat_store::memory::MemoryStatStore, state::AppState};

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .set_stat_store(Arc::new(MemoryStatStore::new()))
            .await;
        state
    }

    fn start(name: &str) -> StartChallengeRequest {
        StartChallengeRequest {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn starting_supersedes_the_previous_challenge() {
        let state = test_state().await;

        let first = start_challenge(&state, start("friday night")).await.unwrap();
        let second = start_challenge(&state, start("saturday final"))
            .await
            .unwrap();
        assert!(second.active);

        let active = active_challenge(&state).await.unwrap().unwrap();
        assert_eq!(active.id, second.challenge_id);

        let list = list_challenges(&state).await.unwrap();
        assert_eq!(list.challenges.len(), 2);
        assert_eq!(list.challenges[0].challenge_id, second.challenge_id);
        assert_eq!(
            list.challenges
                .iter()
                .filter(|challenge| challenge.active)
                .count(),
            1
        );
        let superseded = list
            .challenges
            .iter()
            .find(|challenge| challenge.challenge_id == first.challenge_id)
            .unwrap();
        assert!(superseded.ended_at.is_some());
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let state = test_state().await;
        let err = start_challenge(&state, start("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn no_challenge_is_active_initially() {
        let state = test_state().await;
        assert!(active_challenge(&state).await.unwrap().is_none());
    }
}
