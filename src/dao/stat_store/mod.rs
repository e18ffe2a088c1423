/// In-memory backend used for tests and storage-less deployments.
pub mod memory;
#[cfg(feature = "mongo-store")]
/// MongoDB-backed implementation.
pub mod mongodb;

use crate::dao::models::{
    AnswerStatEntity, ChallengeEntity, GameKind, GameSessionEntity, ParticipantEntity,
    QuestionEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for answer facts, challenges, and
/// the read-only participant/question catalogs.
///
/// Writes are pure inserts and reads are pure aggregations over the returned
/// rows, so backends only need ordinary insert/read isolation. The one
/// exception is [`StatStore::start_challenge`], which must atomically
/// deactivate every previous challenge while inserting the new one.
pub trait StatStore: Send + Sync {
    /// Resolve a participant by their unique code (already normalized to uppercase).
    fn find_participant(&self, code: String)
    -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;
    /// Fetch participants for an explicit id set; unknown ids are skipped.
    fn participants_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>>;
    /// Look up a question by its client-facing identifier.
    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Currently active challenge, if any.
    fn active_challenge(&self) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>>;
    /// Look up a challenge by id, active or not.
    fn find_challenge(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>>;
    /// All challenges, most recently started first.
    fn list_challenges(&self) -> BoxFuture<'static, StorageResult<Vec<ChallengeEntity>>>;
    /// Atomically deactivate all active challenges (stamping their end time
    /// with the new challenge's start time) and insert `challenge`.
    fn start_challenge(&self, challenge: ChallengeEntity)
    -> BoxFuture<'static, StorageResult<()>>;
    /// Append one immutable answer fact.
    fn insert_answer_stat(&self, stat: AnswerStatEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Append a batch of answer facts from a bulk submission.
    fn insert_answer_stats(
        &self,
        stats: Vec<AnswerStatEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Record the summary row for one completed bulk game.
    fn insert_game_session(
        &self,
        session: GameSessionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Raw answer facts recorded under one challenge.
    fn stats_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>>;
    /// Raw answer facts for a participant set across all history.
    fn stats_for_participants(
        &self,
        participant_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>>;
    /// Game session summaries for one participant, optionally filtered by kind.
    fn sessions_for_participant(
        &self,
        participant_id: Uuid,
        game: Option<GameKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>>;
    /// Cheap connectivity probe used by the supervisor and health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a lost backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
