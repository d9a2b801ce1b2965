//! Question matching service.
//!
//! Stores each submitted question and ranks it against the mentor's
//! previously answered questions.

use std::sync::Arc;

use crate::{
    app::errors::AppError,
    config::{Config, TranslationConfig},
    qa::{NewQuestion, QaDocument, QaStore, QuestionSubmission},
    ranking::{CandidateRecord, Embedding, Ranker, SimilarQuestion},
    semantic::{prepare_for_embedding, strip_trailing_newline, EmbeddingError, EmbeddingProvider},
    translate::Translator,
};

pub struct QuestionService {
    store: Arc<dyn QaStore>,
    translator: Box<dyn Translator>,
    embedder: Arc<dyn EmbeddingProvider>,
    ranker: Ranker,
    translation: TranslationConfig,
}

impl QuestionService {
    pub fn new(
        config: &Config,
        store: Arc<dyn QaStore>,
        translator: Box<dyn Translator>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, AppError> {
        let ranker = Ranker::new(config.matching.rank_options())?;

        Ok(Self {
            store,
            translator,
            embedder,
            ranker,
            translation: config.translation.clone(),
        })
    }

    /// Store a new question and return the mentor's most similar answered
    /// questions.
    ///
    /// An empty list means the mentor has too little answered history to
    /// rank against; the embedding model is not touched in that case.
    pub fn submit(&self, submission: QuestionSubmission) -> Result<Vec<SimilarQuestion>, AppError> {
        if submission.mentor_nickname.trim().is_empty() {
            return Err(AppError::InvalidSubmission(
                "mentor_nickname must not be empty".to_string(),
            ));
        }
        if submission.question_summary.trim().is_empty() {
            return Err(AppError::InvalidSubmission(
                "question_summary must not be empty".to_string(),
            ));
        }

        let summary = strip_trailing_newline(&submission.question_summary);
        let translated = self.translator.translate(
            &summary,
            &self.translation.source_language,
            &self.translation.target_language,
        )?;
        let summary_en = strip_trailing_newline(&translated);

        let doc = self.store.insert(NewQuestion {
            mentee_nickname: submission.mentee_nickname,
            mentor_nickname: submission.mentor_nickname,
            question_origin: strip_trailing_newline(&submission.question_origin),
            question_summary: summary,
            question_summary_en: summary_en,
        })?;
        log::info!(
            "stored question id={} mentor={} mentee={}",
            doc.id,
            doc.mentor_nickname,
            doc.mentee_nickname
        );

        let history = self.store.answered_by(&doc.mentor_nickname)?;
        let min_corpus_size = self.ranker.options().min_corpus_size;
        if history.len() < min_corpus_size {
            log::info!(
                "mentor {} has {} answered questions, need {min_corpus_size} to match",
                doc.mentor_nickname,
                history.len()
            );
            return Ok(vec![]);
        }

        let (texts, records): (Vec<String>, Vec<CandidateRecord>) = history
            .iter()
            .filter_map(|d| {
                d.as_candidate()
                    .map(|record| (prepare_for_embedding(&d.question_summary_en), record))
            })
            .unzip();

        let query = self
            .embedder
            .embed(&prepare_for_embedding(&doc.question_summary_en))?;
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != records.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: records.len(),
                got: embeddings.len(),
            }
            .into());
        }

        let candidates: Vec<(Embedding, CandidateRecord)> =
            embeddings.into_iter().zip(records).collect();

        let results = self.ranker.rank(&query, &candidates)?;
        log::info!(
            "question id={} matched {} of {} answered questions",
            doc.id,
            results.len(),
            candidates.len()
        );

        Ok(results)
    }

    /// Record the mentor's answer to a stored question.
    pub fn answer(&self, id: u64, answer: &str) -> Result<QaDocument, AppError> {
        let answer = strip_trailing_newline(answer);
        if answer.trim().is_empty() {
            return Err(AppError::InvalidSubmission(
                "answer must not be empty".to_string(),
            ));
        }

        let doc = self.store.answer(id, &answer)?;
        log::info!("answered question id={} mentor={}", doc.id, doc.mentor_nickname);
        Ok(doc)
    }

    /// A stored question, answered or not.
    pub fn get(&self, id: u64) -> Result<QaDocument, AppError> {
        self.store.get(id)?.ok_or(AppError::NotFound(id))
    }

    /// Answered questions of a mentor, oldest first.
    pub fn history(&self, mentor_nickname: &str) -> Result<Vec<QaDocument>, AppError> {
        Ok(self.store.answered_by(mentor_nickname)?)
    }
}
