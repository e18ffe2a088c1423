use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;
use futures::future::BoxFuture;
use rand::Rng;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{
        AnswerStatEntity, ChallengeEntity, GameKind, GameSessionEntity, ParticipantEntity,
        QuestionEntity,
    },
    stat_store::StatStore,
    storage::StorageResult,
};

/// Length of generated participant codes.
const PARTICIPANT_CODE_LENGTH: usize = 8;
/// Alphabet for generated participant codes (uppercase letters and digits).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a human-friendly participant code.
pub fn generate_participant_code() -> String {
    let mut rng = rand::rng();
    (0..PARTICIPANT_CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// In-memory [`StatStore`] backend.
///
/// Used by the unit tests and as the fallback backend when no database is
/// configured. Challenge mutations run under one write lock so the
/// single-active invariant holds exactly as it would under a database
/// transaction.
#[derive(Clone, Default)]
pub struct MemoryStatStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    participants: DashMap<Uuid, ParticipantEntity>,
    participant_codes: DashMap<String, Uuid>,
    questions: DashMap<i64, QuestionEntity>,
    challenges: RwLock<Vec<ChallengeEntity>>,
    stats: RwLock<Vec<AnswerStatEntity>>,
    sessions: RwLock<Vec<GameSessionEntity>>,
}

impl MemoryStatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the built-in sample question set.
    pub fn with_sample_questions() -> Self {
        let store = Self::new();
        for question in sample_questions() {
            store.seed_question(question);
        }
        store
    }

    /// Register a participant identity (normally owned by the external
    /// account subsystem) with a generated code.
    pub fn seed_participant(&self, name: &str) -> ParticipantEntity {
        let code = loop {
            let candidate = generate_participant_code();
            if !self.inner.participant_codes.contains_key(&candidate) {
                break candidate;
            }
        };
        self.seed_participant_with_code(&code, name, true)
    }

    /// Register a participant with an explicit code and active flag.
    pub fn seed_participant_with_code(
        &self,
        code: &str,
        name: &str,
        active: bool,
    ) -> ParticipantEntity {
        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            code: code.to_uppercase(),
            name: name.to_string(),
            active,
        };
        self.inner
            .participant_codes
            .insert(participant.code.clone(), participant.id);
        self.inner
            .participants
            .insert(participant.id, participant.clone());
        participant
    }

    /// Add a question to the read-only catalog.
    pub fn seed_question(&self, question: QuestionEntity) {
        self.inner.questions.insert(question.id, question);
    }
}

impl StatStore for MemoryStatStore {
    fn find_participant(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let found = inner
                .participant_codes
                .get(&code)
                .and_then(|id| inner.participants.get(id.value()).map(|p| p.clone()));
            Ok(found)
        })
    }

    fn participants_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(ids
                .into_iter()
                .filter_map(|id| inner.participants.get(&id).map(|p| p.clone()))
                .collect())
        })
    }

    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.questions.get(&id).map(|q| q.clone())) })
    }

    fn active_challenge(&self) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.challenges.read().await;
            Ok(guard
                .iter()
                .filter(|challenge| challenge.active)
                .max_by_key(|challenge| challenge.started_at)
                .cloned())
        })
    }

    fn find_challenge(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.challenges.read().await;
            Ok(guard.iter().find(|challenge| challenge.id == id).cloned())
        })
    }

    fn list_challenges(&self) -> BoxFuture<'static, StorageResult<Vec<ChallengeEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.challenges.read().await;
            let mut challenges = guard.clone();
            challenges.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            Ok(challenges)
        })
    }

    fn start_challenge(
        &self,
        challenge: ChallengeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.challenges.write().await;
            for existing in guard.iter_mut().filter(|existing| existing.active) {
                existing.active = false;
                existing.ended_at = Some(challenge.started_at);
            }
            guard.push(challenge);
            Ok(())
        })
    }

    fn insert_answer_stat(&self, stat: AnswerStatEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.stats.write().await.push(stat);
            Ok(())
        })
    }

    fn insert_answer_stats(
        &self,
        stats: Vec<AnswerStatEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.stats.write().await.extend(stats);
            Ok(())
        })
    }

    fn insert_game_session(
        &self,
        session: GameSessionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.sessions.write().await.push(session);
            Ok(())
        })
    }

    fn stats_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.stats.read().await;
            Ok(guard
                .iter()
                .filter(|stat| stat.challenge_id == Some(challenge_id))
                .cloned()
                .collect())
        })
    }

    fn stats_for_participants(
        &self,
        participant_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let wanted: HashSet<Uuid> = participant_ids.into_iter().collect();
            let guard = inner.stats.read().await;
            Ok(guard
                .iter()
                .filter(|stat| wanted.contains(&stat.participant_id))
                .cloned()
                .collect())
        })
    }

    fn sessions_for_participant(
        &self,
        participant_id: Uuid,
        game: Option<GameKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.sessions.read().await;
            Ok(guard
                .iter()
                .filter(|session| session.participant_id == participant_id)
                .filter(|session| game.is_none_or(|kind| session.game == kind))
                .cloned()
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Question set shipped for storage-less demo deployments.
fn sample_questions() -> Vec<QuestionEntity> {
    let raw = [
        (1, "What is the capital of France?", "Paris"),
        (2, "What is 2 + 2?", "4"),
        (3, "What color is the sky?", "Blue"),
        (4, "Who wrote Hamlet?", "Shakespeare"),
        (5, "What is the boiling point of water?", "100"),
    ];
    raw.into_iter()
        .map(|(id, text, correct_answer)| QuestionEntity {
            id,
            text: text.to_string(),
            correct_answer: correct_answer.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn stat(participant_id: Uuid, challenge_id: Option<Uuid>, question_id: i64) -> AnswerStatEntity {
        AnswerStatEntity {
            id: Uuid::new_v4(),
            participant_id,
            challenge_id,
            question_id,
            correct: true,
            time_taken_seconds: 1.5,
            recorded_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn start_challenge_leaves_exactly_one_active() {
        let store = MemoryStatStore::new();

        for name in ["first", "second", "third"] {
            store
                .start_challenge(ChallengeEntity::new(name.to_string()))
                .await
                .unwrap();
        }

        let challenges = store.list_challenges().await.unwrap();
        assert_eq!(challenges.len(), 3);
        assert_eq!(challenges.iter().filter(|c| c.active).count(), 1);

        let active = store.active_challenge().await.unwrap().unwrap();
        assert_eq!(active.name, "third");
        assert!(active.ended_at.is_none());

        let superseded: Vec<_> = challenges.iter().filter(|c| !c.active).collect();
        assert!(superseded.iter().all(|c| c.ended_at.is_some()));
    }

    #[tokio::test]
    async fn concurrent_duplicate_submissions_are_both_recorded() {
        let store = MemoryStatStore::new();
        let participant = store.seed_participant("Dup");
        let challenge = ChallengeEntity::new("round".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();

        let first = store.insert_answer_stat(stat(participant.id, Some(challenge.id), 7));
        let second = store.insert_answer_stat(stat(participant.id, Some(challenge.id), 7));
        let (a, b) = tokio::join!(first, second);
        a.unwrap();
        b.unwrap();

        let rows = store.stats_for_challenge(challenge.id).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn participant_lookup_is_by_exact_uppercase_code() {
        let store = MemoryStatStore::new();
        let seeded = store.seed_participant_with_code("abc123xy", "Casey", true);
        assert_eq!(seeded.code, "ABC123XY");

        let found = store
            .find_participant("ABC123XY".to_string())
            .await
            .unwrap();
        assert_eq!(found.as_ref().map(|p| p.id), Some(seeded.id));
    }

    #[tokio::test]
    async fn session_filter_by_game_kind() {
        let store = MemoryStatStore::new();
        let participant = store.seed_participant("Pat");
        for (game, correct) in [(GameKind::DragDrop, 3), (GameKind::Jigsaw, 1)] {
            store
                .insert_game_session(GameSessionEntity {
                    id: Uuid::new_v4(),
                    participant_id: participant.id,
                    game,
                    total_questions: 4,
                    total_correct: correct,
                    total_time_seconds: 30.0,
                    completed: true,
                    completed_at: SystemTime::now(),
                })
                .await
                .unwrap();
        }

        let all = store
            .sessions_for_participant(participant.id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let jigsaw = store
            .sessions_for_participant(participant.id, Some(GameKind::Jigsaw))
            .await
            .unwrap();
        assert_eq!(jigsaw.len(), 1);
        assert_eq!(jigsaw[0].total_correct, 1);
    }
}
