//! Load-once embedding provider handle.
//!
//! The model is loaded on first use and then shared read-only for the rest
//! of the process. The handle is passed explicitly to whoever needs it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{EmbeddingError, EmbeddingModel, EmbeddingProvider};
use crate::ranking::Embedding;

type Loader<P> = Box<dyn Fn() -> Result<P, EmbeddingError> + Send + Sync>;

/// Lazily-initialized provider.
pub struct LazyProvider<P> {
    name: String,
    loader: Loader<P>,
    /// Uses Mutex<Option<_>> instead of OnceLock because get_or_try_init is
    /// unstable. A failed load leaves it empty so the next call retries.
    provider: Mutex<Option<Arc<P>>>,
}

impl LazyProvider<EmbeddingModel> {
    /// Handle for a fastembed model cached under `cache_dir/models`.
    pub fn fastembed(model_name: &str, cache_dir: PathBuf) -> Self {
        let name = model_name.to_string();
        Self::with_loader(model_name, move || {
            EmbeddingModel::new(&name, cache_dir.clone())
        })
    }
}

impl<P: EmbeddingProvider> LazyProvider<P> {
    pub fn with_loader<F>(name: &str, loader: F) -> Self
    where
        F: Fn() -> Result<P, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            loader: Box::new(loader),
            provider: Mutex::new(None),
        }
    }

    /// Check if the provider has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.provider
            .lock()
            .ok()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Get the provider, loading it on first call.
    pub fn get(&self) -> Result<Arc<P>, EmbeddingError> {
        let mut guard = self.provider.lock().map_err(|e| {
            EmbeddingError::InitFailed(format!("Failed to acquire provider lock: {}", e))
        })?;

        if let Some(provider) = guard.as_ref() {
            return Ok(provider.clone());
        }

        log::debug!("loading embedding provider '{}'", self.name);
        let provider = Arc::new((self.loader)()?);
        *guard = Some(provider.clone());

        Ok(provider)
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for LazyProvider<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.get()?.embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.get()?.embed_batch(texts)
    }
}
