//! Sponsor and product extraction from video text.
//!
//! The sponsor comes from a single labeled field. The product is voted on
//! from a pool of candidates gathered, in order, from the labeled product
//! field, dictionary-bearing list segments, and dictionary-bearing named
//! entities.

mod patterns;

use prwatch_core::{BrandDictionary, ExtractionResult};

use crate::entities::{EntityRecognizer, HeuristicRecognizer};

pub use patterns::{extract_sponsor, labeled_product};

/// Characters that separate list items in descriptions.
const SEGMENT_DELIMITERS: &[char] = &[
    '\n', '\r', '◆', '◇', '◊', '■', '□', '-', '・', '･', '•', '●',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    LabeledField,
    DelimitedSegment,
    NamedEntity,
}

/// A provisional product string and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub source: CandidateSource,
}

impl Candidate {
    fn new(text: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Owns the brand dictionary and entity recognizer for the whole run.
pub struct Extractor {
    dictionary: BrandDictionary,
    recognizer: Box<dyn EntityRecognizer>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("dictionary_terms", &self.dictionary.len())
            .finish_non_exhaustive()
    }
}

impl Extractor {
    #[must_use]
    pub fn new(dictionary: BrandDictionary, recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self {
            dictionary,
            recognizer,
        }
    }

    /// Extractor backed by the built-in [`HeuristicRecognizer`].
    #[must_use]
    pub fn with_heuristics(dictionary: BrandDictionary) -> Self {
        Self::new(dictionary, Box::new(HeuristicRecognizer))
    }

    #[must_use]
    pub fn extract(&self, description: &str, title: &str, transcript: &str) -> ExtractionResult {
        let candidates = self.product_candidates(description, title, transcript);
        let product = resolve_product(&candidates);
        let sponsor = extract_sponsor(description);

        tracing::debug!(
            candidates = candidates.len(),
            product = %product,
            sponsor = %sponsor,
            "extraction finished"
        );

        ExtractionResult { sponsor, product }
    }

    /// Full candidate pool in vote order.
    #[must_use]
    pub fn product_candidates(
        &self,
        description: &str,
        title: &str,
        transcript: &str,
    ) -> Vec<Candidate> {
        let mut pool = Vec::new();

        if let Some(product) = labeled_product(description) {
            pool.push(Candidate::new(product, CandidateSource::LabeledField));
        }

        // Both remaining strategies need a dictionary hit to contribute.
        if self.dictionary.is_empty() {
            return pool;
        }

        pool.extend(self.segment_candidates(description));

        let combined = format!("{description}\n{title}\n{transcript}");
        pool.extend(self.entity_candidates(&combined));

        pool
    }

    fn segment_candidates(&self, description: &str) -> Vec<Candidate> {
        description
            .split(SEGMENT_DELIMITERS)
            .map(str::trim)
            .filter(|segment| !segment.is_empty() && self.dictionary.matches(segment))
            .map(|segment| Candidate::new(segment, CandidateSource::DelimitedSegment))
            .collect()
    }

    fn entity_candidates(&self, text: &str) -> Vec<Candidate> {
        self.recognizer
            .recognize(text)
            .into_iter()
            .filter(|entity| entity.is_brand_like() && self.dictionary.matches(&entity.text))
            .map(|entity| Candidate::new(entity.text, CandidateSource::NamedEntity))
            .collect()
    }
}

/// Most frequent candidate text; the earliest one wins a tie.
#[must_use]
pub fn resolve_product(candidates: &[Candidate]) -> String {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for candidate in candidates {
        match tally.iter_mut().find(|(text, _)| *text == candidate.text) {
            Some((_, count)) => *count += 1,
            None => tally.push((candidate.text.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (text, count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((text, count));
        }
    }
    best.map(|(text, _)| text.to_owned()).unwrap_or_default()
}
