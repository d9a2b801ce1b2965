use crate::ranking::CandidateRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    sync::{Arc, RwLock},
    time::Instant,
};

/// A question asked by a mentee to a mentor, with its answer once given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaDocument {
    pub id: u64,

    pub mentee_nickname: String,
    pub mentor_nickname: String,
    pub question_origin: String,
    pub question_summary: String,
    pub question_summary_en: String,
    pub question_time: DateTime<Utc>,

    pub answer: Option<String>,
    pub answer_time: Option<DateTime<Utc>>,
}

impl QaDocument {
    /// Project an answered document to what the ranker sees.
    ///
    /// Returns `None` when the question has no answer yet.
    pub fn as_candidate(&self) -> Option<CandidateRecord> {
        self.answer.as_ref().map(|answer| CandidateRecord {
            question_summary: self.question_summary.clone(),
            answer: answer.clone(),
        })
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Inbound question from the mentoring service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuestionSubmission {
    pub mentor_nickname: String,
    pub mentee_nickname: String,
    #[serde(default)]
    pub question_origin: String,
    pub question_summary: String,
}

/// Fields of a question about to be stored.
#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub mentee_nickname: String,
    pub mentor_nickname: String,
    pub question_origin: String,
    pub question_summary: String,
    pub question_summary_en: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("question not found: {0}")]
    NotFound(u64),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub trait QaStore: Send + Sync {
    fn insert(&self, question: NewQuestion) -> Result<QaDocument, StoreError>;
    fn get(&self, id: u64) -> Result<Option<QaDocument>, StoreError>;
    /// Answered questions of `mentor_nickname`, in insertion order.
    fn answered_by(&self, mentor_nickname: &str) -> Result<Vec<QaDocument>, StoreError>;
    fn answer(&self, id: u64, answer: &str) -> Result<QaDocument, StoreError>;
    fn list(&self) -> Result<Vec<QaDocument>, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct BackendCsv {
    list: Arc<RwLock<Vec<QaDocument>>>,
    path: String,
}

const CSV_HEADERS: [&str; 9] = [
    "id",
    "mentee_nickname",
    "mentor_nickname",
    "question_origin",
    "question_summary",
    "question_summary_en",
    "question_time",
    "answer",
    "answer_time",
];

impl BackendCsv {
    pub fn load(path: &str) -> Result<Self, StoreError> {
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::info!("Creating new question list at {path}");
                    let mut csv_wrt = csv::Writer::from_path(path)?;
                    csv_wrt.write_record(CSV_HEADERS)?;
                    csv_wrt.flush()?;
                }
                _ => Err(err)?,
            }
        }

        let now = Instant::now();
        let mut csv_reader = csv::Reader::from_path(path)?;

        let mut docs = vec![];
        for record in csv_reader.deserialize() {
            let doc: QaDocument = record?;
            docs.push(doc);
        }

        log::debug!(
            "took {}ms to read {} questions",
            now.elapsed().as_micros() as f64 / 1000.0,
            docs.len()
        );

        Ok(BackendCsv {
            list: Arc::new(RwLock::new(docs)),
            path: path.to_string(),
        })
    }

    fn save(&self, docs: &[QaDocument]) -> Result<(), StoreError> {
        let temp_path = format!("{}-tmp", &self.path);
        let mut csv_wrt = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&temp_path)?;
        csv_wrt.write_record(CSV_HEADERS)?;
        for doc in docs {
            csv_wrt.serialize(doc)?;
        }
        csv_wrt.flush()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl QaStore for BackendCsv {
    fn insert(&self, question: NewQuestion) -> Result<QaDocument, StoreError> {
        let mut docs = self.list.write().map_err(|_| StoreError::Poisoned)?;

        let id = docs.last().map(|last| last.id + 1).unwrap_or(0);

        let doc = QaDocument {
            id,
            mentee_nickname: question.mentee_nickname,
            mentor_nickname: question.mentor_nickname,
            question_origin: question.question_origin,
            question_summary: question.question_summary,
            question_summary_en: question.question_summary_en,
            question_time: Utc::now(),
            answer: None,
            answer_time: None,
        };

        docs.push(doc.clone());
        if let Err(err) = self.save(&docs) {
            docs.pop();
            return Err(err);
        }

        Ok(doc)
    }

    fn get(&self, id: u64) -> Result<Option<QaDocument>, StoreError> {
        let docs = self.list.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    fn answered_by(&self, mentor_nickname: &str) -> Result<Vec<QaDocument>, StoreError> {
        let docs = self.list.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs
            .iter()
            .filter(|d| d.mentor_nickname == mentor_nickname && d.is_answered())
            .cloned()
            .collect())
    }

    fn answer(&self, id: u64, answer: &str) -> Result<QaDocument, StoreError> {
        let mut docs = self.list.write().map_err(|_| StoreError::Poisoned)?;

        let idx = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let previous = docs[idx].clone();
        docs[idx].answer = Some(answer.to_string());
        docs[idx].answer_time = Some(Utc::now());
        let doc = docs[idx].clone();

        if let Err(err) = self.save(&docs) {
            docs[idx] = previous;
            return Err(err);
        }

        Ok(doc)
    }

    fn list(&self) -> Result<Vec<QaDocument>, StoreError> {
        let docs = self.list.read().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.clone())
    }
}
