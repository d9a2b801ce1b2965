//! Top-K semantic similarity ranking.
//!
//! Ranks previously answered questions against a newly submitted one by the
//! cosine similarity of their embeddings.
//!
//! # Architecture
//!
//! - `similarity`: cosine similarity, percentage rescale and rounding
//! - `ranker`: bounded top-K selection and result shaping
//!
//! The ranker is pure: it never calls the embedding provider or the store,
//! and every call owns its own working set.

mod ranker;
mod similarity;

use serde::{Deserialize, Serialize};

pub use ranker::{rank, RankOptions, Ranker};
pub use similarity::{cosine_similarity, cosine_to_percent, round_percent};

/// Number of results a ranking call returns at most.
pub const DEFAULT_TOP_K: usize = 3;

/// Answered questions a mentor needs before ranking is attempted.
pub const DEFAULT_MIN_CORPUS_SIZE: usize = 3;

/// Similarity floor in percent. Inactive unless explicitly enabled.
pub const SIMILARITY_CRITERION_PERCENT: f64 = 10.0;

/// Largest accepted K.
pub const MAX_TOP_K: usize = 64;

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// A previously answered question as seen by the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub question_summary: String,
    pub answer: String,
}

/// Ranked output entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarQuestion {
    pub question_summary: String,
    pub answer: String,
    /// Similarity in [0, 100], rounded to two decimals
    pub similarity_percent: f64,
}

/// Errors that can occur while ranking.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("invalid embedding for {}: {reason}", subject(.index))]
    InvalidEmbedding {
        /// Candidate position, `None` for the query
        index: Option<usize>,
        reason: String,
    },

    #[error("invalid ranking configuration: {0}")]
    InvalidConfiguration(String),
}

impl RankError {
    pub(crate) fn invalid_embedding(index: Option<usize>, reason: impl Into<String>) -> Self {
        RankError::InvalidEmbedding {
            index,
            reason: reason.into(),
        }
    }
}

fn subject(index: &Option<usize>) -> String {
    match index {
        Some(idx) => format!("candidate #{idx}"),
        None => "query".to_string(),
    }
}
