//! crucible CLI — local dev-loop entry point for the submission
//! evaluation pipeline: run one submission against a question fixture
//! and a config file, without an HTTP layer or a persistent question
//! store in front of it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crucible::config::{self, PipelineConfig};
use crucible::model::{Language, Submission, Test};
use crucible::orchestrator::Orchestrator;
use crucible::report;
use crucible::sandbox::kube::KubeProvider;
use crucible::store::{InMemoryQuestionStore, QuestionStore};

#[derive(Parser)]
#[command(name = "crucible")]
#[command(about = "Synthesizes test harnesses and evaluates submissions in cluster sandboxes", long_about = None)]
#[command(version)]
struct Cli {
    /// Pipeline configuration file path.
    #[arg(short, long, default_value = "crucible.toml")]
    config: PathBuf,

    /// Verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    Python,
    Java,
}

impl From<LanguageArg> for Language {
    fn from(language: LanguageArg) -> Self {
        match language {
            LanguageArg::Python => Language::Python,
            LanguageArg::Java => Language::Java,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one submission against a question fixture's tests.
    Run {
        /// Path to a question fixture (JSON, see [`QuestionFixture`]).
        #[arg(long)]
        question: PathBuf,

        /// Path to the submitted source file.
        #[arg(long)]
        solution: PathBuf,

        /// Language the submission is written in.
        #[arg(long, value_enum)]
        language: LanguageArg,

        /// Print results as JSON instead of a console summary.
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file without running anything.
    Validate,

    /// Write a starter configuration file.
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            question,
            solution,
            language,
            json,
        } => run(&cli.config, &question, &solution, language.into(), json).await,
        Commands::Validate => validate_config(&cli.config),
        Commands::Init => init_config(),
    }
}

/// The wire shape of a question fixture file: the same fields
/// `POST /questions` accepts (spec §6), read from disk instead of a
/// document store for the local dev loop.
#[derive(Deserialize)]
struct QuestionFixture {
    title: String,
    description: String,
    level: u32,
    tests: Vec<Test>,
    #[serde(rename = "inputTypes")]
    input_types: String,
    #[serde(rename = "outputType")]
    output_type: String,
}

async fn run(
    config_path: &Path,
    question_path: &Path,
    solution_path: &Path,
    language: Language,
    json: bool,
) -> Result<()> {
    let config = config::load_config(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let fixture_content = std::fs::read_to_string(question_path)
        .with_context(|| format!("failed to read question fixture {}", question_path.display()))?;
    let fixture: QuestionFixture = serde_json::from_str(&fixture_content)
        .with_context(|| format!("failed to parse question fixture {}", question_path.display()))?;

    let function_code = std::fs::read_to_string(solution_path)
        .with_context(|| format!("failed to read solution file {}", solution_path.display()))?;

    let store = InMemoryQuestionStore::new();
    let question_title = fixture.title.clone();
    let question_id = store
        .create(
            fixture.title,
            fixture.description,
            fixture.level,
            fixture.tests,
            fixture.input_types,
            fixture.output_type,
        )
        .await
        .context("question fixture failed validation")?;

    let provider = KubeProvider::new(config.clone())
        .await
        .context("failed to connect to cluster")?;
    let orchestrator = Orchestrator::new(config, Arc::new(store), Arc::new(provider));

    let submission = Submission {
        function_code,
        question_id,
        language,
    };
    let workspace_root = std::env::temp_dir();
    let results = orchestrator.run(&submission, &workspace_root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report::print_summary(&question_title, &results);
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    match config::load_config(config_path) {
        Ok(cfg) => {
            println!("Configuration is valid!");
            println!();
            println!("Settings:");
            println!("  max_parallel: {}", cfg.max_parallel);
            println!("  test_timeout_secs: {}", cfg.test_timeout_secs);
            println!("  poll_interval_ms: {}", cfg.poll_interval_ms);
            println!("  poll_max_attempts: {:?}", cfg.poll_max_attempts);
            println!("  namespace: {}", cfg.namespace);
            println!(
                "  kubeconfig: {}",
                cfg.resolve_kubeconfig_path().unwrap_or_else(|| "(cluster default)".to_string())
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_config() -> Result<()> {
    let path = PathBuf::from("crucible.toml");
    if path.exists() {
        bail!("crucible.toml already exists. Remove it first or edit manually.");
    }

    let config = r#"# crucible pipeline configuration

max_parallel = 4
test_timeout_secs = 60
poll_interval_ms = 5000
poll_max_attempts = 24
namespace = "default"
# kubeconfig_path = "/path/to/kubeconfig"  # defaults to $KUBECONFIG
"#;

    std::fs::write(&path, config)?;
    println!("Created crucible.toml");
    println!();
    println!("Edit the configuration as needed, then run:");
    println!("  crucible run --question question.json --solution solution.py --language python");
    Ok(())
}
