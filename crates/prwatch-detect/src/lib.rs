//! Sponsored-video detection: keyword classification, sponsor/product
//! extraction, and confidence scoring.

pub mod analyzer;
pub mod classify;
pub mod entities;
pub mod extract;
pub mod score;

pub use analyzer::Analyzer;
pub use classify::{classify, find_pr_keyword};
pub use entities::{Entity, EntityLabel, EntityRecognizer, HeuristicRecognizer, NoopRecognizer};
pub use extract::{Candidate, CandidateSource, Extractor};
pub use score::confidence_score;
