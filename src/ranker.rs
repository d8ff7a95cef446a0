//! Keyword Ranker - lexical scoring of BNS sections against a free-text query
//!
//! Not semantic search: the only job of this pass is to bound how much statute
//! text is forwarded to the language model. Every record is scored with the
//! cumulative rules below, zero scores are dropped, and the rest are stably
//! sorted so equal scores keep dataset order.
//!
//! | Rule                                   | Default |
//! |----------------------------------------|---------|
//! | whole query in title                   | +10     |
//! | whole query in description             | +5      |
//! | whole query in category                | +3      |
//! | each long query word in title          | +2      |
//! | each long query word in description    | +1      |
//!
//! "Long" means more than `min_word_chars - 1` characters (4+ by default).

use crate::section_store::{SectionRecord, SectionStore};

/// Number of sections handed to the model per question
pub const DEFAULT_CONTEXT_SECTIONS: usize = 5;

/// Scoring weights for the keyword ranker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub title_phrase: u32,
    pub description_phrase: u32,
    pub category_phrase: u32,
    pub title_word: u32,
    pub description_word: u32,
    /// Query words shorter than this are ignored
    pub min_word_chars: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_phrase: 10,
            description_phrase: 5,
            category_phrase: 3,
            title_word: 2,
            description_word: 1,
            min_word_chars: 4,
        }
    }
}

/// A section paired with its relevance score for one query
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    pub section: &'a SectionRecord,
    pub score: u32,
}

/// Stateless ranker; results depend only on the store, the query and the weights
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRanker {
    weights: ScoringWeights,
}

impl KeywordRanker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score a single record against an already lowercased query
    fn score_record(&self, record: &SectionRecord, query: &str, words: &[&str]) -> u32 {
        let w = &self.weights;
        let title = record.title.to_lowercase();
        let description = record.description.to_lowercase();
        let category = record.category.to_lowercase();

        let mut score = 0;
        if title.contains(query) {
            score += w.title_phrase;
        }
        if description.contains(query) {
            score += w.description_phrase;
        }
        if category.contains(query) {
            score += w.category_phrase;
        }

        for word in words {
            if title.contains(word) {
                score += w.title_word;
            }
            if description.contains(word) {
                score += w.description_word;
            }
        }

        score
    }

    /// All records with a positive score, best first (ties in dataset order)
    pub fn score_all<'a>(&self, store: &'a SectionStore, query: &str) -> Vec<ScoredMatch<'a>> {
        if query.trim().is_empty() {
            return vec![];
        }
        // Phrase matching uses the query as typed, surrounding whitespace included
        let query = query.to_lowercase();

        let words: Vec<&str> = query
            .split_whitespace()
            .filter(|word| word.chars().count() >= self.weights.min_word_chars)
            .collect();

        let mut matches: Vec<ScoredMatch<'a>> = store
            .iter()
            .filter_map(|section| {
                let score = self.score_record(section, &query, &words);
                (score > 0).then_some(ScoredMatch { section, score })
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    /// Top `limit` sections for `query`
    pub fn rank<'a>(&self, store: &'a SectionStore, query: &str, limit: usize) -> Vec<&'a SectionRecord> {
        let matches = self.score_all(store, query);
        tracing::debug!(
            "Ranked '{}': {} scored sections, returning up to {}",
            query,
            matches.len(),
            limit
        );

        matches
            .into_iter()
            .take(limit)
            .map(|m| m.section)
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
