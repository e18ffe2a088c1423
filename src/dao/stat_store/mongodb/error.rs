use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load participant by code")]
    LoadParticipant {
        #[source]
        source: MongoError,
    },
    #[error("failed to load question `{id}`")]
    LoadQuestion {
        id: i64,
        #[source]
        source: MongoError,
    },
    #[error("failed to load challenge")]
    LoadChallenge {
        #[source]
        source: MongoError,
    },
    #[error("failed to list challenges")]
    ListChallenges {
        #[source]
        source: MongoError,
    },
    #[error("failed to start challenge `{id}`")]
    StartChallenge {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert answer stat `{id}`")]
    InsertAnswerStat {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert game session `{id}`")]
    InsertGameSession {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load answer stats")]
    LoadStats {
        #[source]
        source: MongoError,
    },
    #[error("failed to load game sessions")]
    LoadSessions {
        #[source]
        source: MongoError,
    },
}
