#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use speaklegal_core::{
    AnalyzerConfig, DocumentAnalyzer, GenerationError, GenerationRequest, TaskKind, TextGenerator,
};

pub enum Reply {
    Text(String),
    Fail(GenerationError),
    Slow(Duration, String),
    Hang,
    Panic,
}

type Script = dyn Fn(TaskKind, &str) -> Reply + Send + Sync;

/// In-memory generator. The script sees the task and the user message, which
/// ends with the segment text.
pub struct ScriptedGenerator {
    script: Box<Script>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: impl Fn(TaskKind, &str) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let user = request
            .messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or_default();

        match (self.script)(request.task, user) {
            Reply::Text(text) => Ok(text),
            Reply::Fail(err) => Err(err),
            Reply::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
            Reply::Panic => panic!("scripted generator panic"),
        }
    }
}

/// A well-formed answer for every task.
pub fn happy_reply(task: TaskKind) -> Reply {
    match task {
        TaskKind::Simplify => Reply::Text("In plain words.".to_string()),
        TaskKind::ExtractClauses => Reply::Text(
            r#"[{"clause": "at any time", "whyConfusing": "No notice period", "riskLevel": "high"}]"#
                .to_string(),
        ),
        TaskKind::GenerateQuestions => Reply::Text(
            r#"[{"question": "How much notice do I get?", "context": "Entry"}]"#.to_string(),
        ),
    }
}

pub fn analyzer_with(generator: Arc<ScriptedGenerator>, timeout: Duration) -> DocumentAnalyzer {
    let config = AnalyzerConfig::new("test-model")
        .with_call_timeout(timeout)
        .build()
        .expect("valid test config");
    DocumentAnalyzer::new(generator, config)
}

pub fn paragraphs(bodies: &[&str]) -> String {
    bodies.join("\n\n")
}
