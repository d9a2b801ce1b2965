use crate::{
    ranking::{
        RankOptions, DEFAULT_MIN_CORPUS_SIZE, DEFAULT_TOP_K, MAX_TOP_K,
        SIMILARITY_CRITERION_PERCENT,
    },
    semantic::DEFAULT_MODEL,
    storage::{BackendLocal, StorageManager},
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SOURCE_LANGUAGE: &str = "ko";
const DEFAULT_TARGET_LANGUAGE: &str = "en";
/// Default translation request timeout in seconds
const DEFAULT_TRANSLATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Configuration for question matching
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum number of similar questions returned
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Answered questions a mentor needs before matching is attempted
    #[serde(default = "default_min_corpus_size")]
    pub min_corpus_size: usize,

    /// Similarity floor in percent [0, 100]
    #[serde(default = "default_similarity_criterion_percent")]
    pub similarity_criterion_percent: f64,

    /// Drop results at or below `similarity_criterion_percent`.
    /// Off by default.
    #[serde(default)]
    pub apply_similarity_floor: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            min_corpus_size: DEFAULT_MIN_CORPUS_SIZE,
            similarity_criterion_percent: SIMILARITY_CRITERION_PERCENT,
            apply_similarity_floor: false,
        }
    }
}

impl MatchingConfig {
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            top_k: self.top_k,
            min_corpus_size: self.min_corpus_size,
            similarity_floor: self
                .apply_similarity_floor
                .then_some(self.similarity_criterion_percent),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_corpus_size() -> usize {
    DEFAULT_MIN_CORPUS_SIZE
}

fn default_similarity_criterion_percent() -> f64 {
    SIMILARITY_CRITERION_PERCENT
}

/// Configuration for the translation service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_source_language")]
    pub source_language: String,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Base URL of a LibreTranslate-compatible service.
    /// Translation is skipped when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_TRANSLATION_TIMEOUT_SECS,
        }
    }
}

fn default_source_language() -> String {
    DEFAULT_SOURCE_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_translation_timeout_secs() -> u64 {
    DEFAULT_TRANSLATION_TIMEOUT_SECS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            matching: MatchingConfig::default(),
            translation: TranslationConfig::default(),
            base_path: String::new(),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        let matching = &self.matching;
        if matching.top_k == 0 || matching.top_k > MAX_TOP_K {
            return Err(ConfigError::Invalid(format!(
                "matching.top_k must be between 1 and {MAX_TOP_K}, got {}",
                matching.top_k
            )));
        }

        if !(0.0..=100.0).contains(&matching.similarity_criterion_percent) {
            return Err(ConfigError::Invalid(format!(
                "matching.similarity_criterion_percent must be between 0 and 100, got {}",
                matching.similarity_criterion_percent
            )));
        }

        let translation = &self.translation;
        if translation.source_language.trim().is_empty()
            || translation.target_language.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "translation.source_language and translation.target_language must be set"
                    .to_string(),
            ));
        }

        if translation.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "translation.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> Result<Self, ConfigError> {
        let store = BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_creates_default_config() {
        let dir = temp_dir();
        let base_path = dir.path().to_str().unwrap();

        let config = Config::load_with(base_path).unwrap();

        assert!(BackendLocal::new(base_path).unwrap().exists(CONFIG_FILE));
        assert_eq!(config.matching, MatchingConfig::default());
        assert_eq!(config.translation, TranslationConfig::default());
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.base_path, base_path);
    }

    #[test]
    fn test_partial_config_gets_defaults() {
        let dir = temp_dir();
        let base_path = dir.path().to_str().unwrap();
        let store = BackendLocal::new(base_path).unwrap();

        let config_content = r#"
matching:
  top_k: 5
translation:
  endpoint: http://localhost:5000
"#;
        store.write(CONFIG_FILE, config_content.as_bytes()).unwrap();

        let config = Config::load_with(base_path).unwrap();
        assert_eq!(config.matching.top_k, 5);
        assert_eq!(config.matching.min_corpus_size, 3);
        assert_eq!(config.matching.model, "all-MiniLM-L6-v2");
        assert_eq!(
            config.translation.endpoint.as_deref(),
            Some("http://localhost:5000")
        );
        assert_eq!(config.translation.source_language, "ko");

        // normalized config was written back
        let saved = String::from_utf8(store.read(CONFIG_FILE).unwrap()).unwrap();
        assert!(saved.contains("min_corpus_size: 3"));
    }

    #[test]
    fn test_invalid_top_k_rejected() {
        let dir = temp_dir();
        let base_path = dir.path().to_str().unwrap();
        let store = BackendLocal::new(base_path).unwrap();
        store
            .write(CONFIG_FILE, b"matching:\n  top_k: 0\n")
            .unwrap();

        let result = Config::load_with(base_path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let dir = temp_dir();
        let base_path = dir.path().to_str().unwrap();
        let store = BackendLocal::new(base_path).unwrap();
        store.write(CONFIG_FILE, b"matching: [1, 2").unwrap();

        let result = Config::load_with(base_path);
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_rank_options_floor_inert_by_default() {
        let matching = MatchingConfig::default();
        assert_eq!(matching.rank_options().similarity_floor, None);

        let matching = MatchingConfig {
            apply_similarity_floor: true,
            ..Default::default()
        };
        assert_eq!(
            matching.rank_options().similarity_floor,
            Some(SIMILARITY_CRITERION_PERCENT)
        );
    }
}
