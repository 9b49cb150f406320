//! askql CLI - ask questions about tabular data from the command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use askql_core::{QueryEngine, RelationalStore};
use askql_pipeline::{PipelineConfig, ServiceState};

#[derive(Parser)]
#[command(name = "askql")]
#[command(about = "Answer natural-language questions over tabular data with SQL")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question and print the response envelope as JSON
    Ask {
        /// The question, in natural language
        question: String,
    },

    /// Print the schema description given to the model
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = PipelineConfig::from_env()?;

    match cli.command {
        Commands::Ask { question } => ask(&config, &question).await?,
        Commands::Schema => show_schema(&config).await?,
    }

    Ok(())
}

async fn ask(config: &PipelineConfig, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let pipeline = match ServiceState::initialize(config).await {
        ServiceState::Ready(pipeline) => pipeline,
        ServiceState::Degraded { reason } => {
            anyhow::bail!("Pipeline not initialized: {}", reason)
        }
    };

    let envelope = pipeline.answer(question).await;
    info!(
        "Answered with status {:?} using {} tokens",
        envelope.status, envelope.data.tokens_used
    );
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn show_schema(config: &PipelineConfig) -> Result<()> {
    let mut engine = QueryEngine::new(config.sample_rows);
    engine.load_tables(&config.tables).await?;

    let description = engine.describe_schema().await?;
    println!("{}", description);
    Ok(())
}
