use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, DateTime, Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoAnswerStatDocument, MongoChallengeDocument, MongoGameSessionDocument,
        MongoParticipantDocument, MongoQuestionDocument, doc_id, uuid_as_binary,
    },
};
use crate::dao::{
    models::{
        AnswerStatEntity, ChallengeEntity, GameKind, GameSessionEntity, ParticipantEntity,
        QuestionEntity,
    },
    stat_store::StatStore,
    storage::StorageResult,
};

const PARTICIPANT_COLLECTION_NAME: &str = "participants";
const QUESTION_COLLECTION_NAME: &str = "questions";
const CHALLENGE_COLLECTION_NAME: &str = "challenges";
const ANSWER_STAT_COLLECTION_NAME: &str = "answer_stats";
const GAME_SESSION_COLLECTION_NAME: &str = "game_sessions";

#[derive(Clone)]
pub struct MongoStatStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStatStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let participants =
            database.collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION_NAME);
        let code_index = mongodb::IndexModel::builder()
            .keys(doc! {"code": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("participant_code_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        participants
            .create_index(code_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PARTICIPANT_COLLECTION_NAME,
                index: "code",
                source,
            })?;

        let challenges = database.collection::<MongoChallengeDocument>(CHALLENGE_COLLECTION_NAME);
        let active_index = mongodb::IndexModel::builder()
            .keys(doc! {"active": 1, "started_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("challenge_active_idx".to_owned()))
                    .build(),
            )
            .build();
        challenges
            .create_index(active_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CHALLENGE_COLLECTION_NAME,
                index: "active,started_at",
                source,
            })?;

        // The broadcast loops aggregate by challenge on every tick.
        let stats = database.collection::<MongoAnswerStatDocument>(ANSWER_STAT_COLLECTION_NAME);
        let stat_index = mongodb::IndexModel::builder()
            .keys(doc! {"challenge_id": 1, "participant_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("stat_challenge_idx".to_owned()))
                    .build(),
            )
            .build();
        stats
            .create_index(stat_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ANSWER_STAT_COLLECTION_NAME,
                index: "challenge_id,participant_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    async fn participant_collection(&self) -> Collection<MongoParticipantDocument> {
        self.database()
            .await
            .collection(PARTICIPANT_COLLECTION_NAME)
    }

    async fn question_collection(&self) -> Collection<MongoQuestionDocument> {
        self.database().await.collection(QUESTION_COLLECTION_NAME)
    }

    async fn challenge_collection(&self) -> Collection<MongoChallengeDocument> {
        self.database().await.collection(CHALLENGE_COLLECTION_NAME)
    }

    async fn stat_collection(&self) -> Collection<MongoAnswerStatDocument> {
        self.database()
            .await
            .collection(ANSWER_STAT_COLLECTION_NAME)
    }

    async fn session_collection(&self) -> Collection<MongoGameSessionDocument> {
        self.database()
            .await
            .collection(GAME_SESSION_COLLECTION_NAME)
    }

    async fn find_participant(&self, code: String) -> MongoResult<Option<ParticipantEntity>> {
        let collection = self.participant_collection().await;
        let document = collection
            .find_one(doc! {"code": code})
            .await
            .map_err(|source| MongoDaoError::LoadParticipant { source })?;
        Ok(document.map(Into::into))
    }

    async fn participants_by_ids(&self, ids: Vec<Uuid>) -> MongoResult<Vec<ParticipantEntity>> {
        let collection = self.participant_collection().await;
        let ids: Vec<Bson> = ids
            .into_iter()
            .map(|id| Bson::Binary(uuid_as_binary(id)))
            .collect();
        let documents: Vec<MongoParticipantDocument> = collection
            .find(doc! {"_id": {"$in": ids}})
            .await
            .map_err(|source| MongoDaoError::LoadParticipant { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadParticipant { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_question(&self, id: i64) -> MongoResult<Option<QuestionEntity>> {
        let collection = self.question_collection().await;
        let document = collection
            .find_one(doc! {"_id": id})
            .await
            .map_err(|source| MongoDaoError::LoadQuestion { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn active_challenge(&self) -> MongoResult<Option<ChallengeEntity>> {
        let collection = self.challenge_collection().await;
        let document = collection
            .find_one(doc! {"active": true})
            .sort(doc! {"started_at": -1})
            .await
            .map_err(|source| MongoDaoError::LoadChallenge { source })?;
        Ok(document.map(Into::into))
    }

    async fn find_challenge(&self, id: Uuid) -> MongoResult<Option<ChallengeEntity>> {
        let collection = self.challenge_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadChallenge { source })?;
        Ok(document.map(Into::into))
    }

    async fn list_challenges(&self) -> MongoResult<Vec<ChallengeEntity>> {
        let collection = self.challenge_collection().await;
        let documents: Vec<MongoChallengeDocument> = collection
            .find(doc! {})
            .sort(doc! {"started_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListChallenges { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListChallenges { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Deactivate-all plus insert inside one causally consistent transaction,
    /// so readers never observe two active challenges or a half-applied swap.
    async fn start_challenge(&self, challenge: ChallengeEntity) -> MongoResult<()> {
        let id = challenge.id;
        let client = self.client().await;
        let collection = self.challenge_collection().await;

        let mut session = client
            .start_session()
            .await
            .map_err(|source| MongoDaoError::StartChallenge { id, source })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::StartChallenge { id, source })?;

        let ended_at = DateTime::from_system_time(challenge.started_at);
        collection
            .update_many(
                doc! {"active": true},
                doc! {"$set": {"active": false, "ended_at": ended_at}},
            )
            .session(&mut session)
            .await
            .map_err(|source| MongoDaoError::StartChallenge { id, source })?;

        let document: MongoChallengeDocument = challenge.into();
        collection
            .insert_one(&document)
            .session(&mut session)
            .await
            .map_err(|source| MongoDaoError::StartChallenge { id, source })?;

        session
            .commit_transaction()
            .await
            .map_err(|source| MongoDaoError::StartChallenge { id, source })?;
        Ok(())
    }

    async fn insert_answer_stat(&self, stat: AnswerStatEntity) -> MongoResult<()> {
        let id = stat.id;
        let document: MongoAnswerStatDocument = stat.into();
        let collection = self.stat_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertAnswerStat { id, source })?;
        Ok(())
    }

    async fn insert_answer_stats(&self, stats: Vec<AnswerStatEntity>) -> MongoResult<()> {
        if stats.is_empty() {
            return Ok(());
        }
        let first_id = stats[0].id;
        let documents: Vec<MongoAnswerStatDocument> =
            stats.into_iter().map(Into::into).collect();
        let collection = self.stat_collection().await;
        collection
            .insert_many(&documents)
            .await
            .map_err(|source| MongoDaoError::InsertAnswerStat {
                id: first_id,
                source,
            })?;
        Ok(())
    }

    async fn insert_game_session(&self, session: GameSessionEntity) -> MongoResult<()> {
        let id = session.id;
        let document: MongoGameSessionDocument = session.into();
        let collection = self.session_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertGameSession { id, source })?;
        Ok(())
    }

    async fn stats_for_challenge(&self, challenge_id: Uuid) -> MongoResult<Vec<AnswerStatEntity>> {
        let collection = self.stat_collection().await;
        let documents: Vec<MongoAnswerStatDocument> = collection
            .find(doc! {"challenge_id": uuid_as_binary(challenge_id)})
            .await
            .map_err(|source| MongoDaoError::LoadStats { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadStats { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn stats_for_participants(
        &self,
        participant_ids: Vec<Uuid>,
    ) -> MongoResult<Vec<AnswerStatEntity>> {
        let collection = self.stat_collection().await;
        let ids: Vec<Bson> = participant_ids
            .into_iter()
            .map(|id| Bson::Binary(uuid_as_binary(id)))
            .collect();
        let documents: Vec<MongoAnswerStatDocument> = collection
            .find(doc! {"participant_id": {"$in": ids}})
            .await
            .map_err(|source| MongoDaoError::LoadStats { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadStats { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn sessions_for_participant(
        &self,
        participant_id: Uuid,
        game: Option<GameKind>,
    ) -> MongoResult<Vec<GameSessionEntity>> {
        let collection = self.session_collection().await;
        let mut filter: Document = doc! {"participant_id": uuid_as_binary(participant_id)};
        if let Some(kind) = game {
            filter.insert("game", kind.as_str());
        }
        let documents: Vec<MongoGameSessionDocument> = collection
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::LoadSessions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadSessions { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl StatStore for MongoStatStore {
    fn find_participant(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_participant(code).await.map_err(Into::into) })
    }

    fn participants_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.participants_by_ids(ids).await.map_err(Into::into) })
    }

    fn find_question(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn active_challenge(&self) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.active_challenge().await.map_err(Into::into) })
    }

    fn find_challenge(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_challenge(id).await.map_err(Into::into) })
    }

    fn list_challenges(&self) -> BoxFuture<'static, StorageResult<Vec<ChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_challenges().await.map_err(Into::into) })
    }

    fn start_challenge(
        &self,
        challenge: ChallengeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.start_challenge(challenge).await.map_err(Into::into) })
    }

    fn insert_answer_stat(&self, stat: AnswerStatEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer_stat(stat).await.map_err(Into::into) })
    }

    fn insert_answer_stats(
        &self,
        stats: Vec<AnswerStatEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer_stats(stats).await.map_err(Into::into) })
    }

    fn insert_game_session(
        &self,
        session: GameSessionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game_session(session).await.map_err(Into::into) })
    }

    fn stats_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .stats_for_challenge(challenge_id)
                .await
                .map_err(Into::into)
        })
    }

    fn stats_for_participants(
        &self,
        participant_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerStatEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .stats_for_participants(participant_ids)
                .await
                .map_err(Into::into)
        })
    }

    fn sessions_for_participant(
        &self,
        participant_id: Uuid,
        game: Option<GameKind>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameSessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .sessions_for_participant(participant_id, game)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
