use crate::{
    app::QuestionService,
    config::Config,
    qa::{BackendCsv, QaStore},
    ranking::Embedding,
    semantic::{EmbeddingError, EmbeddingProvider},
    translate::{TranslateError, Translator},
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

const VOCABULARY: [&str; 8] = [
    "rust", "python", "interview", "resume", "career", "salary", "study", "project",
];

/// Bag-of-keywords embedder. The last dimension is a small bias so that no
/// text embeds to a zero vector.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub batch_sizes: std::sync::Mutex<Vec<usize>>,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Embedding {
        let text = text.to_lowercase();
        let mut v: Embedding = VOCABULARY
            .iter()
            .map(|word| text.matches(word).count() as f32)
            .collect();
        v.push(0.1);
        v
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(texts.len());
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Embedder that always fails.
pub struct BrokenEmbedder;

impl EmbeddingProvider for BrokenEmbedder {
    fn name(&self) -> &str {
        "broken"
    }

    fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("model unavailable".to_string()))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("model unavailable".to_string()))
    }
}

/// Embedder that breaks the provider contract with all-zero vectors.
pub struct ZeroEmbedder;

impl EmbeddingProvider for ZeroEmbedder {
    fn name(&self) -> &str {
        "zero"
    }

    fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(vec![0.0; 4])
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
    }
}

/// "Translates" by prefixing the text with the target language.
pub struct TaggingTranslator;

impl Translator for TaggingTranslator {
    fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String, TranslateError> {
        Ok(format!("[{target}] {text}\n"))
    }
}

pub struct FailingTranslator;

impl Translator for FailingTranslator {
    fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Empty)
    }
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub store: Arc<BackendCsv>,
    pub embedder: Arc<KeywordEmbedder>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa_list.csv");
        let store = Arc::new(BackendCsv::load(path.to_str().unwrap()).unwrap());
        Self {
            dir,
            store,
            embedder: Arc::new(KeywordEmbedder::default()),
        }
    }

    pub fn service(&self) -> QuestionService {
        self.service_with(Config::default(), Box::new(TaggingTranslator))
    }

    pub fn service_with(&self, config: Config, translator: Box<dyn Translator>) -> QuestionService {
        QuestionService::new(
            &config,
            self.store.clone(),
            translator,
            self.embedder.clone(),
        )
        .unwrap()
    }

    /// Store an already answered question for `mentor`.
    pub fn answered(&self, mentor: &str, summary_en: &str, answer: &str) -> u64 {
        let doc = self
            .store
            .insert(crate::qa::NewQuestion {
                mentee_nickname: "mentee".to_string(),
                mentor_nickname: mentor.to_string(),
                question_origin: summary_en.to_string(),
                question_summary: summary_en.to_string(),
                question_summary_en: summary_en.to_string(),
            })
            .unwrap();
        self.store.answer(doc.id, answer).unwrap();
        doc.id
    }
}
