//! Speaklegal Core Library
//!
//! Splits legal documents into sections and analyzes each one concurrently
//! with a text-generation service: a plain-language rewrite, flagged
//! clauses and questions to ask a lawyer.

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod format;
pub mod generation;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod segmenter;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{FALLBACK_SIMPLIFIED_TEXT, SegmentAnalysis, SegmentAnalyzer, TaskOutcome};
pub use config::{AnalyzerConfig, GenerationParams};
pub use error::{AnalyzeError, ConfigError, GenerationError, ProviderError, Result};
pub use format::format_analysis_readable;
pub use generation::{
    Attribution, ChatCompletionsClient, ChatMessage, GenerationRequest, Role, TextGenerator,
};
pub use pipeline::{DocumentAnalyzer, MIN_INPUT_CHARS};
pub use provider::{Provider, ProviderConfig};
pub use segmenter::split_into_segments;
pub use types::{
    AnalysisResult, AnalyzeRequest, ConfusingClause, RiskLevel, Segment, SimplifiedSection,
    SuggestedQuestion, TaskKind,
};
