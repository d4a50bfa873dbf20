use std::{sync::Arc, time::Duration};

use crate::{
    config::{AnalyzerConfig, GenerationParams},
    error::GenerationError,
    generation::{GenerationRequest, TextGenerator, generate_with_deadline},
    parser::{parse_clauses, parse_questions},
    prompts::build_messages,
    types::{ConfusingClause, Segment, SimplifiedSection, SuggestedQuestion, TaskKind},
};

pub const FALLBACK_SIMPLIFIED_TEXT: &str = "Unable to simplify this section.";

/// Settled result of one analysis task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Completed(T),
    Fallback { reason: String },
}

impl<T> TaskOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, TaskOutcome::Fallback { .. })
    }

    pub fn into_value_or(self, fallback: T) -> T {
        match self {
            TaskOutcome::Completed(value) => value,
            TaskOutcome::Fallback { .. } => fallback,
        }
    }
}

/// Everything produced for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAnalysis {
    pub section: SimplifiedSection,
    pub clauses: Vec<ConfusingClause>,
    pub questions: Vec<SuggestedQuestion>,
}

impl SegmentAnalysis {
    /// All-fallback result, used when a segment could not be processed at all.
    pub fn fallback(segment: &Segment) -> Self {
        Self {
            section: fallback_section(segment),
            clauses: Vec::new(),
            questions: Vec::new(),
        }
    }
}

fn fallback_section(segment: &Segment) -> SimplifiedSection {
    SimplifiedSection {
        original_text: segment.text.clone(),
        simplified_text: FALLBACK_SIMPLIFIED_TEXT.to_string(),
        section_index: segment.index,
    }
}

/// Runs the simplify / extract-clauses / generate-questions trio for a segment.
#[derive(Clone)]
pub struct SegmentAnalyzer {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    call_timeout: Duration,
}

impl SegmentAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &AnalyzerConfig) -> Self {
        Self {
            generator,
            params: config.params.clone(),
            call_timeout: config.call_timeout,
        }
    }

    /// Dispatch all three tasks at once and wait for every one to settle.
    /// A failed task only replaces its own output with a fallback.
    pub async fn analyze_segment(&self, segment: &Segment) -> SegmentAnalysis {
        let (simplified, clauses, questions) = tokio::join!(
            self.simplify(segment),
            self.extract_clauses(segment),
            self.generate_questions(segment),
        );

        let section = match simplified {
            TaskOutcome::Completed(simplified_text) => SimplifiedSection {
                original_text: segment.text.clone(),
                simplified_text,
                section_index: segment.index,
            },
            TaskOutcome::Fallback { .. } => fallback_section(segment),
        };

        SegmentAnalysis {
            section,
            clauses: clauses.into_value_or(Vec::new()),
            questions: questions.into_value_or(Vec::new()),
        }
    }

    pub async fn simplify(&self, segment: &Segment) -> TaskOutcome<String> {
        self.run(TaskKind::Simplify, segment, |payload| payload.trim().to_string())
            .await
    }

    pub async fn extract_clauses(&self, segment: &Segment) -> TaskOutcome<Vec<ConfusingClause>> {
        self.run(TaskKind::ExtractClauses, segment, |payload| {
            parse_clauses(&payload, segment.index)
        })
        .await
    }

    pub async fn generate_questions(
        &self,
        segment: &Segment,
    ) -> TaskOutcome<Vec<SuggestedQuestion>> {
        self.run(TaskKind::GenerateQuestions, segment, |payload| {
            parse_questions(&payload, &segment.text)
        })
        .await
    }

    async fn run<T>(
        &self,
        task: TaskKind,
        segment: &Segment,
        decode: impl FnOnce(String) -> T,
    ) -> TaskOutcome<T> {
        let request = GenerationRequest {
            task,
            messages: build_messages(task, &segment.text),
            params: self.params.clone(),
        };

        match generate_with_deadline(self.generator.as_ref(), request, self.call_timeout).await {
            Ok(payload) => TaskOutcome::Completed(decode(payload)),
            Err(err) => {
                log_fallback(task, segment.index, &err);
                TaskOutcome::Fallback {
                    reason: err.to_string(),
                }
            }
        }
    }
}

fn log_fallback(task: TaskKind, section_index: usize, err: &GenerationError) {
    tracing::warn!(
        task = task.name(),
        section_index,
        error = %err,
        "generation failed, using fallback"
    );
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::RiskLevel;

    /// Answers by task kind; `None` means the call fails upstream.
    struct ByTask {
        simplify: Option<&'static str>,
        clauses: Option<&'static str>,
        questions: Option<&'static str>,
    }

    #[async_trait]
    impl TextGenerator for ByTask {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            let answer = match request.task {
                TaskKind::Simplify => self.simplify,
                TaskKind::ExtractClauses => self.clauses,
                TaskKind::GenerateQuestions => self.questions,
            };
            answer
                .map(str::to_string)
                .ok_or(GenerationError::UpstreamError { status: 503 })
        }
    }

    fn segment() -> Segment {
        Segment {
            index: 2,
            text: "The tenant indemnifies the landlord against all losses whatsoever.".into(),
        }
    }

    fn analyzer(generator: ByTask) -> SegmentAnalyzer {
        SegmentAnalyzer::new(Arc::new(generator), &AnalyzerConfig::new("test-model"))
    }

    #[tokio::test]
    async fn combines_three_successful_tasks() {
        let analyzer = analyzer(ByTask {
            simplify: Some("  You pay for anything that goes wrong.  "),
            clauses: Some(r#"[{"clause": "all losses whatsoever", "whyConfusing": "Unlimited", "riskLevel": "high"}]"#),
            questions: Some(r#"[{"question": "Is there a cap?", "context": "Indemnity"}]"#),
        });

        let analysis = analyzer.analyze_segment(&segment()).await;

        assert_eq!(analysis.section.simplified_text, "You pay for anything that goes wrong.");
        assert_eq!(analysis.section.original_text, segment().text);
        assert_eq!(analysis.section.section_index, 2);
        assert_eq!(analysis.clauses.len(), 1);
        assert_eq!(analysis.clauses[0].risk_level, RiskLevel::High);
        assert_eq!(analysis.clauses[0].section_index, 2);
        assert_eq!(analysis.questions[0].related_clause, segment().text);
    }

    #[tokio::test]
    async fn each_task_falls_back_on_its_own() {
        let analyzer = analyzer(ByTask {
            simplify: None,
            clauses: Some(r#"[{"clause": "a", "whyConfusing": "b"}]"#),
            questions: None,
        });

        let analysis = analyzer.analyze_segment(&segment()).await;

        assert_eq!(analysis.section.simplified_text, FALLBACK_SIMPLIFIED_TEXT);
        assert_eq!(analysis.section.original_text, segment().text);
        assert_eq!(analysis.clauses.len(), 1);
        assert!(analysis.questions.is_empty());
    }

    #[tokio::test]
    async fn failed_task_reports_fallback_reason() {
        let analyzer = analyzer(ByTask {
            simplify: None,
            clauses: None,
            questions: None,
        });

        let outcome = analyzer.simplify(&segment()).await;
        assert!(outcome.is_fallback());
        assert_eq!(
            outcome,
            TaskOutcome::Fallback {
                reason: "Generation service returned status 503".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_payload_is_a_successful_empty_answer() {
        let analyzer = analyzer(ByTask {
            simplify: Some(""),
            clauses: Some(""),
            questions: Some("[]"),
        });

        let analysis = analyzer.analyze_segment(&segment()).await;

        assert_eq!(analysis.section.simplified_text, "");
        assert!(analysis.clauses.is_empty());
        assert!(analysis.questions.is_empty());
    }

    #[test]
    fn fallback_keeps_original_text() {
        let analysis = SegmentAnalysis::fallback(&segment());
        assert_eq!(analysis.section.original_text, segment().text);
        assert_eq!(analysis.section.simplified_text, FALLBACK_SIMPLIFIED_TEXT);
        assert!(analysis.clauses.is_empty() && analysis.questions.is_empty());
    }
}
