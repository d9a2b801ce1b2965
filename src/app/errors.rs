use crate::{
    qa::StoreError, ranking::RankError, semantic::EmbeddingError, translate::TranslateError,
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("question {0} not found")]
    NotFound(u64),

    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("ranking error: {0}")]
    Rank(#[from] RankError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            err => AppError::Store(err),
        }
    }
}
