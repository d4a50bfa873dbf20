use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::Instrument;

use crate::{
    aggregate::aggregate,
    analyzer::{SegmentAnalysis, SegmentAnalyzer},
    config::AnalyzerConfig,
    error::{AnalyzeError, Result},
    generation::TextGenerator,
    segmenter::split_into_segments,
    types::{AnalysisResult, AnalyzeRequest, Segment},
};

/// Shortest document, in characters after trimming, that is worth analyzing.
pub const MIN_INPUT_CHARS: usize = 50;

/// Entry point of the analysis pipeline: segment, fan out, aggregate.
#[derive(Clone)]
pub struct DocumentAnalyzer {
    segment_analyzer: SegmentAnalyzer,
    max_concurrent_segments: usize,
}

impl DocumentAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: AnalyzerConfig) -> Self {
        Self {
            segment_analyzer: SegmentAnalyzer::new(generator, &config),
            max_concurrent_segments: config.max_concurrent_segments.max(1),
        }
    }

    /// Analyze a document.
    ///
    /// Only validation can fail. Once the input is accepted the result is
    /// always complete, with fallback content wherever generation failed.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        let text = validate_request(request)?;
        let run_id = uuid::Uuid::new_v4();

        let result = async move {
            let segments = split_into_segments(text);
            tracing::info!(segments = segments.len(), "document segmented");

            let analyses = self.analyze_segments(segments).await;
            let result = aggregate(analyses);

            tracing::info!(
                clauses = result.confusing_clauses.len(),
                questions = result.suggested_questions.len(),
                "analysis complete"
            );
            result
        }
        .instrument(tracing::info_span!("analyze", %run_id))
        .await;

        Ok(result)
    }

    /// Analyze every segment, at most `max_concurrent_segments` at a time.
    ///
    /// Each segment runs as its own task. Results land in one slot per
    /// segment index, so completion order never affects output order. A task
    /// that dies leaves its slot empty and the segment gets a full fallback.
    pub async fn analyze_segments(&self, segments: Vec<Segment>) -> Vec<SegmentAnalysis> {
        let segments: Arc<[Segment]> = segments.into();
        let limiter = Arc::new(Semaphore::new(self.max_concurrent_segments));
        let mut tasks = JoinSet::new();

        for position in 0..segments.len() {
            let analyzer = self.segment_analyzer.clone();
            let segments = Arc::clone(&segments);
            let limiter = Arc::clone(&limiter);
            let span = tracing::debug_span!("segment", index = segments[position].index);

            tasks.spawn(
                async move {
                    // The semaphore is never closed, so acquiring cannot fail.
                    let _permit = limiter.acquire_owned().await.ok();
                    let analysis = analyzer.analyze_segment(&segments[position]).await;
                    (position, analysis)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<SegmentAnalysis>> =
            std::iter::repeat_with(|| None).take(segments.len()).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, analysis)) => {
                    debug_assert!(slots[position].is_none(), "slot written twice");
                    slots[position] = Some(analysis);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "segment task failed, using fallback");
                }
            }
        }

        slots
            .into_iter()
            .zip(segments.iter())
            .map(|(slot, segment)| slot.unwrap_or_else(|| SegmentAnalysis::fallback(segment)))
            .collect()
    }
}

/// Reject empty or too-short input before any work starts. Returns the
/// trimmed text.
pub fn validate_request(request: &AnalyzeRequest) -> Result<&str> {
    let text = request.text.trim();

    if text.is_empty() {
        return Err(AnalyzeError::Validation {
            reason: "document text is required".to_string(),
        });
    }

    let length = text.chars().count();
    if length < MIN_INPUT_CHARS {
        return Err(AnalyzeError::Validation {
            reason: format!(
                "document text must be at least {MIN_INPUT_CHARS} characters, got {length}"
            ),
        });
    }

    Ok(text)
}
