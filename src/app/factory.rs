use crate::{
    app::service::QuestionService,
    config::Config,
    qa::BackendCsv,
    semantic::LazyProvider,
    translate,
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::path::PathBuf;
use std::sync::Arc;

/// Application factory for creating and configuring application components
pub struct AppFactory;

impl AppFactory {
    /// Create the question service from the configuration under `paths`.
    ///
    /// The embedding model is not loaded here; it loads on the first
    /// submission that has enough history to rank against.
    pub fn create_service(paths: &AppPaths) -> Result<(Config, QuestionService)> {
        let config = Config::load_with(&paths.base_path).context("Failed to load config")?;

        let store = BackendCsv::load(&paths.questions_path)
            .with_context(|| format!("Failed to open {}", paths.questions_path))?;

        let translator = translate::from_config(&config.translation)
            .context("Failed to create translation client")?;

        let embedder = LazyProvider::fastembed(
            &config.matching.model,
            PathBuf::from(&paths.base_path),
        );

        let service = QuestionService::new(
            &config,
            Arc::new(store),
            translator,
            Arc::new(embedder),
        )?;

        Ok((config, service))
    }

    /// Get application paths with validation
    pub fn get_paths() -> Result<AppPaths> {
        let base_path = Self::get_base_path()?;

        // Ensure base directory exists
        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths::new(&base_path))
    }

    /// Get the base path for the application
    fn get_base_path() -> Result<String> {
        if let Ok(base_path) = std::env::var("QAMATCH_BASE_PATH") {
            return Ok(base_path);
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;
        Ok(format!("{}/.local/share/qamatch", home.to_string_lossy()))
    }
}

/// Application paths structure
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_path: String,
    pub questions_path: String,
}

impl AppPaths {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            questions_path: format!("{base_path}/qa_list.csv"),
        }
    }
}
