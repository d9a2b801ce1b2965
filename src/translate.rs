//! Translation of submitted question summaries into the matching language.
//!
//! `HttpTranslator` speaks the LibreTranslate `/translate` API. When no
//! endpoint is configured, or source and target are the same language,
//! `PassthroughTranslator` is used instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TranslationConfig;

/// Error type for translation operations
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("translation service returned an empty translation")]
    Empty,
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Returns the input unchanged.
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

/// Client for a LibreTranslate-compatible HTTP endpoint.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/translate", endpoint.trim_end_matches('/')),
            api_key,
        })
    }

    fn extract_translation(status: u16, resp: TranslateResponse) -> Result<String, TranslateError> {
        if let Some(message) = resp.error {
            return Err(TranslateError::Service { status, message });
        }

        match resp.translated_text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(TranslateError::Empty),
        }
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        log::debug!("translating {} chars {source}->{target}", text.chars().count());

        let resp = self
            .client
            .post(&self.url)
            .json(&TranslateRequest {
                q: text,
                source,
                target,
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<TranslateResponse>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.to_string());
            log::warn!("translation error: status={status} error={message}");
            return Err(TranslateError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.json::<TranslateResponse>()?;
        Self::extract_translation(status.as_u16(), body)
    }
}

/// Build the translator the configuration asks for.
///
/// `TRANSLATE_API_KEY` from the environment takes precedence over the
/// configured key.
pub fn from_config(config: &TranslationConfig) -> Result<Box<dyn Translator>, TranslateError> {
    if config.source_language == config.target_language {
        log::info!("source and target language are equal; translation disabled");
        return Ok(Box::new(PassthroughTranslator));
    }

    match &config.endpoint {
        Some(endpoint) => {
            let api_key = std::env::var("TRANSLATE_API_KEY")
                .ok()
                .or_else(|| config.api_key.clone());
            log::info!("using translation endpoint {endpoint}");
            Ok(Box::new(HttpTranslator::new(
                endpoint,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        None => {
            log::warn!("translation endpoint is not configured; summaries are matched untranslated");
            Ok(Box::new(PassthroughTranslator))
        }
    }
}
