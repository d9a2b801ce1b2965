//! Bounded top-K selection over scored candidates.

use std::cmp::Ordering;

use super::similarity::{checked_norm, cosine_to_percent, cosine_with_norms, round_percent};
use super::{
    CandidateRecord, Embedding, RankError, SimilarQuestion, DEFAULT_MIN_CORPUS_SIZE,
    DEFAULT_TOP_K, MAX_TOP_K,
};

/// Options controlling a ranking call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// Maximum number of results (K)
    pub top_k: usize,
    /// Candidate count below which ranking is skipped
    pub min_corpus_size: usize,
    /// Drop results at or below this percentage. `None` keeps the floor inert.
    pub similarity_floor: Option<f64>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_corpus_size: DEFAULT_MIN_CORPUS_SIZE,
            similarity_floor: None,
        }
    }
}

/// A candidate annotated with its score. Lives only for one ranking call.
#[derive(Debug, Clone)]
struct ScoredCandidate<'a> {
    record: &'a CandidateRecord,
    similarity_percent: f64,
    /// Position in the input sequence
    position: usize,
}

impl ScoredCandidate<'_> {
    fn into_similar_question(self) -> SimilarQuestion {
        SimilarQuestion {
            question_summary: self.record.question_summary.clone(),
            answer: self.record.answer.clone(),
            similarity_percent: round_percent(self.similarity_percent),
        }
    }
}

/// Fixed working set of K slots. `None` is a sentinel slot with score 0.
struct TopK<'a> {
    slots: Vec<Option<ScoredCandidate<'a>>>,
}

impl<'a> TopK<'a> {
    fn new(k: usize) -> Self {
        Self {
            slots: vec![None; k],
        }
    }

    /// Offer a candidate to the working set. Returns whether it was kept.
    ///
    /// Free slots are claimed first. Once full, the candidate replaces the
    /// current minimum only when its score is strictly greater, so an equal
    /// score never displaces an earlier candidate. Among several residents
    /// tied at the minimum, the latest arrival is the one evicted.
    fn offer(&mut self, candidate: ScoredCandidate<'a>) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(candidate);
            return true;
        }

        let weakest = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (idx, c)))
            .min_by(|(_, a), (_, b)| {
                a.similarity_percent
                    .total_cmp(&b.similarity_percent)
                    .then(b.position.cmp(&a.position))
            })
            .map(|(idx, c)| (idx, c.similarity_percent));

        match weakest {
            Some((idx, min)) if candidate.similarity_percent > min => {
                self.slots[idx] = Some(candidate);
                true
            }
            _ => false,
        }
    }

    /// Filled slots, sentinels dropped.
    fn into_selected(self) -> Vec<ScoredCandidate<'a>> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Ranks answered questions against a query embedding.
///
/// Stateless apart from its options; one instance can serve any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct Ranker {
    options: RankOptions,
}

impl Ranker {
    /// Create a ranker, validating the options.
    pub fn new(options: RankOptions) -> Result<Self, RankError> {
        if options.top_k == 0 {
            return Err(RankError::InvalidConfiguration(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if options.top_k > MAX_TOP_K {
            return Err(RankError::InvalidConfiguration(format!(
                "top_k must be at most {MAX_TOP_K}, got {}",
                options.top_k
            )));
        }

        if let Some(floor) = options.similarity_floor {
            if !floor.is_finite() || !(0.0..=100.0).contains(&floor) {
                return Err(RankError::InvalidConfiguration(format!(
                    "similarity floor must be between 0 and 100, got {floor}"
                )));
            }
        }

        Ok(Self { options })
    }

    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Rank `candidates` against `query`.
    ///
    /// Candidate order matters: on equal scores the earlier candidate wins.
    /// Returns an empty list when there are fewer than `min_corpus_size`
    /// candidates, without inspecting any embedding.
    pub fn rank(
        &self,
        query: &[f32],
        candidates: &[(Embedding, CandidateRecord)],
    ) -> Result<Vec<SimilarQuestion>, RankError> {
        if candidates.len() < self.options.min_corpus_size {
            log::debug!(
                "skipping ranking: {} candidates, need at least {}",
                candidates.len(),
                self.options.min_corpus_size
            );
            return Ok(vec![]);
        }

        let query_norm = checked_norm(query, None)?;

        let mut top = TopK::new(self.options.top_k);
        for (position, (embedding, record)) in candidates.iter().enumerate() {
            if embedding.len() != query.len() {
                return Err(RankError::invalid_embedding(
                    Some(position),
                    format!(
                        "dimension mismatch: expected {}, got {}",
                        query.len(),
                        embedding.len()
                    ),
                ));
            }

            let norm = checked_norm(embedding, Some(position))?;
            let cosine = cosine_with_norms(query, embedding, query_norm, norm);

            top.offer(ScoredCandidate {
                record,
                similarity_percent: cosine_to_percent(cosine),
                position,
            });
        }

        let mut selected = top.into_selected();

        if let Some(floor) = self.options.similarity_floor {
            selected.retain(|c| c.similarity_percent > floor);
        }

        selected.sort_by(|a, b| match b.similarity_percent.total_cmp(&a.similarity_percent) {
            Ordering::Equal => a.position.cmp(&b.position),
            ord => ord,
        });

        log::debug!(
            "ranked {} candidates, {} selected",
            candidates.len(),
            selected.len()
        );

        Ok(selected
            .into_iter()
            .map(ScoredCandidate::into_similar_question)
            .collect())
    }
}

/// Rank with an explicit K and corpus minimum, floor inactive.
pub fn rank(
    query: &[f32],
    candidates: &[(Embedding, CandidateRecord)],
    top_k: usize,
    min_corpus_size: usize,
) -> Result<Vec<SimilarQuestion>, RankError> {
    Ranker::new(RankOptions {
        top_k,
        min_corpus_size,
        similarity_floor: None,
    })?
    .rank(query, candidates)
}
