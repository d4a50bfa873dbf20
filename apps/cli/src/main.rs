use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{fs, io::AsyncReadExt};
use tracing_subscriber::EnvFilter;

use speaklegal_core::{
    AnalysisResult, AnalyzeError, AnalyzeRequest, AnalyzerConfig, ChatCompletionsClient,
    DocumentAnalyzer, Provider, format_analysis_readable,
};

const OPENROUTER_REFERER: &str = "https://speaklegal.app";
const OPENROUTER_TITLE: &str = "Speak Legal App";

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Openrouter,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openrouter => Provider::OpenRouter,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Parser)]
#[command(name = "speaklegal")]
#[command(
    about = "Explain a legal document in plain language, flag risky clauses and suggest questions for a lawyer"
)]
struct Cli {
    /// Path to a plain-text document, or "-" to read stdin
    input: PathBuf,

    /// AI provider used for analysis
    #[arg(short, long, default_value = "openrouter")]
    provider: CliProvider,

    /// Model name. Defaults to the provider's default model.
    #[arg(short, long)]
    model: Option<String>,

    /// Deadline for each generation call, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Sections analyzed at the same time
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// Print the result as JSON instead of markdown
    #[arg(long)]
    json: bool,

    /// Also save the result as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_document(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read document from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))
}

/// Save an analysis result as pretty JSON
async fn save_result(result: &AnalysisResult, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(result)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();

    // Validate API key early
    let api_key = match provider.validate_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let model = cli
        .model
        .unwrap_or_else(|| provider.config().model.to_string());
    let config = AnalyzerConfig::new(model)
        .with_call_timeout(Duration::from_secs(cli.timeout_secs))
        .with_max_concurrent_segments(cli.concurrency)
        .build()?;

    let text = read_document(&cli.input).await?;
    tracing::debug!(
        provider = provider.name(),
        model = %config.params.model,
        chars = text.len(),
        "document loaded"
    );

    // Keep stdout clean for machine-readable output
    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("speaklegal").cyan().bold(),
            style("Document Analyzer").dim()
        );
    }

    let mut client = ChatCompletionsClient::for_provider(&provider, api_key);
    if provider == Provider::OpenRouter {
        client = client.with_attribution(OPENROUTER_REFERER, OPENROUTER_TITLE);
    }
    let analyzer = DocumentAnalyzer::new(Arc::new(client), config);

    let started = Instant::now();
    let spinner = create_spinner(&format!("Analyzing document with {}...", provider.name()));

    let result = match analyzer.analyze(&AnalyzeRequest::new(text)).await {
        Ok(result) => result,
        Err(AnalyzeError::Validation { reason }) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), reason);
            std::process::exit(1);
        }
    };

    spinner.finish_with_message(format!(
        "{} Analyzed: {} sections, {} clauses, {} questions {}",
        style("✓").green().bold(),
        result.simplified_sections.len(),
        style(result.confusing_clauses.len()).yellow(),
        result.suggested_questions.len(),
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    ));

    if let Some(path) = &cli.output {
        save_result(&result, path).await?;
        eprintln!(
            "\n{} {}",
            style("Saved:").dim(),
            style(path.display()).cyan()
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", format_analysis_readable(&result));
    }

    Ok(())
}
