use prwatch_core::{video_url, ClassificationResult, EnrichedRecord, VideoSummary};

use crate::extract::Extractor;
use crate::score::confidence_score;

/// Turns a classified video and its transcript into an output record.
#[derive(Debug)]
pub struct Analyzer {
    extractor: Extractor,
}

impl Analyzer {
    #[must_use]
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    #[must_use]
    pub fn analyze(
        &self,
        video: VideoSummary,
        classification: ClassificationResult,
        transcript: String,
    ) -> EnrichedRecord {
        let extraction = self
            .extractor
            .extract(&video.description, &video.title, &transcript);
        let confidence_score = confidence_score(
            &extraction.product,
            &video.title,
            &video.description,
            &transcript,
        );
        let video_url = video_url(&video.id);

        tracing::debug!(
            video_id = %video.id,
            product = %extraction.product,
            confidence_score,
            "video analyzed"
        );

        EnrichedRecord {
            video,
            classification,
            transcript,
            extraction,
            confidence_score,
            video_url,
        }
    }
}
