use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    AnswerStatEntity, ChallengeEntity, GameKind, GameSessionEntity, ParticipantEntity,
    QuestionEntity,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    code: String,
    name: String,
    active: bool,
}

impl From<MongoParticipantDocument> for ParticipantEntity {
    fn from(value: MongoParticipantDocument) -> Self {
        Self {
            id: value.id,
            code: value.code,
            name: value.name,
            active: value.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: i64,
    text: String,
    correct_answer: String,
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: value.id,
            text: value.text,
            correct_answer: value.correct_answer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChallengeDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    active: bool,
    started_at: DateTime,
    ended_at: Option<DateTime>,
}

impl From<ChallengeEntity> for MongoChallengeDocument {
    fn from(value: ChallengeEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            active: value.active,
            started_at: DateTime::from_system_time(value.started_at),
            ended_at: value.ended_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoChallengeDocument> for ChallengeEntity {
    fn from(value: MongoChallengeDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            active: value.active,
            started_at: value.started_at.to_system_time(),
            ended_at: value.ended_at.map(|at| at.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerStatDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    participant_id: Uuid,
    challenge_id: Option<Uuid>,
    question_id: i64,
    correct: bool,
    time_taken_seconds: f64,
    recorded_at: DateTime,
}

impl From<AnswerStatEntity> for MongoAnswerStatDocument {
    fn from(value: AnswerStatEntity) -> Self {
        Self {
            id: value.id,
            participant_id: value.participant_id,
            challenge_id: value.challenge_id,
            question_id: value.question_id,
            correct: value.correct,
            time_taken_seconds: value.time_taken_seconds,
            recorded_at: DateTime::from_system_time(value.recorded_at),
        }
    }
}

impl From<MongoAnswerStatDocument> for AnswerStatEntity {
    fn from(value: MongoAnswerStatDocument) -> Self {
        Self {
            id: value.id,
            participant_id: value.participant_id,
            challenge_id: value.challenge_id,
            question_id: value.question_id,
            correct: value.correct,
            time_taken_seconds: value.time_taken_seconds,
            recorded_at: value.recorded_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameSessionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    participant_id: Uuid,
    game: GameKind,
    total_questions: u32,
    total_correct: u32,
    total_time_seconds: f64,
    completed: bool,
    completed_at: DateTime,
}

impl From<GameSessionEntity> for MongoGameSessionDocument {
    fn from(value: GameSessionEntity) -> Self {
        Self {
            id: value.id,
            participant_id: value.participant_id,
            game: value.game,
            total_questions: value.total_questions,
            total_correct: value.total_correct,
            total_time_seconds: value.total_time_seconds,
            completed: value.completed,
            completed_at: DateTime::from_system_time(value.completed_at),
        }
    }
}

impl From<MongoGameSessionDocument> for GameSessionEntity {
    fn from(value: MongoGameSessionDocument) -> Self {
        Self {
            id: value.id,
            participant_id: value.participant_id,
            game: value.game,
            total_questions: value.total_questions,
            total_correct: value.total_correct,
            total_time_seconds: value.total_time_seconds,
            completed: value.completed,
            completed_at: value.completed_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
