//! Embedding generation for question summaries.
//!
//! # Architecture
//!
//! - `embeddings`: Wraps fastembed for embedding generation
//! - `lazy`: Load-once provider handle shared by the service
//! - `preprocess`: Text cleanup before storage and embedding

pub mod embeddings;
mod lazy;
mod preprocess;

pub use embeddings::{EmbeddingError, EmbeddingModel};
pub use lazy::LazyProvider;
pub use preprocess::{prepare_for_embedding, strip_trailing_newline};

use crate::ranking::Embedding;

/// Default embedding model name
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Turns text into fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model version and must
/// return vectors of the same dimension for every input.
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;
}
