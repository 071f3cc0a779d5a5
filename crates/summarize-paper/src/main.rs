use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use shared::report::{render_section, render_title};
use shared::{
    build_model, normalizer_for, save_report, Config, PaperReport, Provider, SourceFormat,
    Summarizer,
};
use std::io::{self as stdio, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// arXiv URL, read from the ar5iv HTML rendering
    #[value(alias = "ar5iv")]
    Html,
    /// Local PDF, structured by a GROBID service
    #[value(alias = "pdf")]
    Xml,
}

impl From<Format> for SourceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => SourceFormat::Html,
            Format::Xml => SourceFormat::Xml,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelProvider {
    Openai,
    Anthropic,
}

impl From<ModelProvider> for Provider {
    fn from(provider: ModelProvider) -> Self {
        match provider {
            ModelProvider::Openai => Provider::OpenAi,
            ModelProvider::Anthropic => Provider::Anthropic,
        }
    }
}

#[derive(Parser)]
#[command(name = "summarize-paper")]
#[command(about = "Summarize a research paper section by section with an LLM")]
struct Args {
    /// arXiv URL (html) or path / file:// URL of a PDF (xml)
    source: String,

    /// Source format
    #[arg(short, long, value_enum, default_value = "html")]
    format: Format,

    /// Model provider
    #[arg(short, long, value_enum, default_value = "openai")]
    provider: ModelProvider,

    /// Model name passed to the provider
    #[arg(short, long, default_value = shared::llm::DEFAULT_MODEL)]
    model: String,

    /// Also save the summaries as a JSON report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log requests and parsing decisions
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stdio::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let config = Config::from_env()?;

    // Fail on a missing API key before any document is fetched
    let model = build_model(args.provider.into(), &args.model, &config)?;
    let summarizer = Summarizer::new(model);

    eprintln!("📄 Reading paper from {}...", args.source);
    let normalizer = normalizer_for(args.format.into(), &config)?;
    let paper = normalizer
        .normalize(&args.source)
        .await
        .with_context(|| format!("Failed to read paper: {}", args.source))?;

    eprintln!("✓ Found {} sections", paper.sections().len());
    if paper.sections().is_empty() {
        eprintln!("  Note: no sections detected, nothing to summarize");
    }

    eprintln!("\n🤖 Summarizing with {}...", summarizer.model_name());

    let mut report = PaperReport::new(&paper, &args.source, summarizer.model_name());
    let mut stdout = stdio::stdout();
    write!(stdout, "{}", render_title(paper.title()))?;
    stdout.flush()?;

    let mut summaries = Box::pin(summarizer.summarize(&paper));
    while let Some(summary) = summaries.next().await {
        let summary = summary.context("Failed to summarize section")?;
        write!(stdout, "{}", render_section(&summary))?;
        stdout.flush()?;
        report.push(summary);
    }

    eprintln!("✓ Summarized {} sections", report.sections.len());

    if let Some(path) = args.output {
        save_report(&report, &path)?;
        eprintln!("\n✅ Report saved to: {}", path.display());
    }

    Ok(())
}
