//! Plume - AI-assisted French writing companion
//!
//! P L U M E
//!
//! Corrects French text with the Gemini API, keeps a history of past
//! corrections, and turns that history into personalized study advice.

use anyhow::Result;
use clap::{Parser, Subcommand};
use plume_adapters::config::Config;
use plume_adapters::model_cache::ModelCache;
use plume_adapters::store::CorrectionStore;
use plume_core::correction::{CorrectionItem, CorrectionResult};
use plume_core::history::SaveCorrectionParams;
use plume_engine::llm;
use std::io::Read;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "plume",
    about = "AI-assisted French writing corrector",
    long_about = "P L U M E\n\n\
                  Corrects French text with Gemini, explains every change,\n\
                  and distills your history into study advice.",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Correct French text (from an argument, --file, or stdin)
    Correct {
        /// The text to correct
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
        /// Don't record the result in the history
        #[arg(long)]
        no_save: bool,
    },
    /// Show past corrections, most recent first
    History {
        /// Maximum number of records to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete one stored correction by id
    Delete { id: String },
    /// Generate study advice from your correction history
    Advice,
    /// Inspect or change the active Gemini model
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Print the active model identifier
    Get,
    /// Set the active model identifier
    Set { name: String },
    /// List models available to the configured credential
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // One cache per process; `model set` invalidates it so later commands
    // in the same process re-resolve the configured model.
    let cache = ModelCache::new();

    match args.command {
        Command::Correct {
            text,
            file,
            no_save,
        } => run_correct(cache, text, file, no_save).await,
        Command::History { limit } => run_history(limit),
        Command::Delete { id } => run_delete(&id),
        Command::Advice => run_advice(cache).await,
        Command::Model { command } => run_model(cache, command).await,
    }
}

fn build_client(cache: ModelCache) -> Result<llm::GeminiClient> {
    let config = Config::load();
    llm::GeminiClient::from_config(&config, cache)
}

/// Resolve the input text from argument, file, or stdin (in that order).
fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(&path)?);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

async fn run_correct(
    cache: ModelCache,
    text: Option<String>,
    file: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let input = read_input(text, file)?;
    let client = build_client(cache)?;

    eprintln!("  Correcting with {}...", client.resolve_model());
    let result = llm::correct_text(&client, &input).await?;

    if result.corrected_text.is_empty() && result.corrections.is_empty() {
        println!("Nothing to correct.");
        return Ok(());
    }

    print_result(&result);

    if !no_save {
        let config = Config::load();
        let store = CorrectionStore::open_default()?;
        let record = store.save(
            &config.current_user_id(),
            SaveCorrectionParams {
                original_text: input,
                corrected_text: result.corrected_text.clone(),
                corrections: result.corrections.clone(),
            },
        )?;
        eprintln!("  Saved to history ({})", record.id);
    }

    Ok(())
}

fn print_result(result: &CorrectionResult) {
    println!("{}", result.corrected_text);
    println!();
    println!("  {}", result.explanation);
    if !result.corrections.is_empty() {
        println!();
        println!(
            "  {} correction{}:",
            result.corrections.len(),
            if result.corrections.len() == 1 { "" } else { "s" }
        );
        for item in &result.corrections {
            print_correction(item);
        }
    }
}

fn print_correction(item: &CorrectionItem) {
    println!(
        "  [{}] \"{}\" -> \"{}\"",
        item.kind.label(),
        item.original,
        item.corrected
    );
    let note = if item.short_explanation.is_empty() {
        &item.explanation
    } else {
        &item.short_explanation
    };
    if !note.is_empty() {
        println!("      {}", note);
    }
}

fn run_history(limit: usize) -> Result<()> {
    let config = Config::load();
    let store = CorrectionStore::open_default()?;
    let records = store.list(&config.current_user_id())?;

    if records.is_empty() {
        println!("No corrections recorded yet.");
        return Ok(());
    }

    for record in records.iter().take(limit) {
        println!(
            "{}  {}  ({} correction{})",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.id,
            record.corrections.len(),
            if record.corrections.len() == 1 { "" } else { "s" }
        );
        println!("  {}", record.corrected_text);
    }
    if records.len() > limit {
        eprintln!("  ({} more; raise --limit to see them)", records.len() - limit);
    }
    Ok(())
}

fn run_delete(id: &str) -> Result<()> {
    let id = Uuid::parse_str(id).map_err(|_| anyhow::anyhow!("'{}' is not a valid id", id))?;
    let store = CorrectionStore::open_default()?;
    store.delete(id)?;
    println!("Deleted {}", id);
    Ok(())
}

async fn run_advice(cache: ModelCache) -> Result<()> {
    let config = Config::load();
    let store = CorrectionStore::open_default()?;
    let items: Vec<CorrectionItem> = store
        .list(&config.current_user_id())?
        .into_iter()
        .flat_map(|record| record.corrections)
        .collect();

    let client = build_client(cache)?;
    eprintln!("  Analyzing {} past corrections...", items.len());
    let advice = llm::study_advice(&client, &items).await;

    println!("{}", advice.summary);
    for entry in &advice.corrections {
        println!();
        println!("[{}] {}", entry.category, entry.title);
        println!("  {}", entry.content);
        for example in &entry.examples {
            println!("    \"{}\" -> \"{}\"", example.original, example.corrected);
            if !example.explanation.is_empty() {
                println!("      {}", example.explanation);
            }
        }
    }
    Ok(())
}

async fn run_model(cache: ModelCache, command: ModelCommand) -> Result<()> {
    match command {
        ModelCommand::Get => {
            println!("{}", Config::load().model());
            Ok(())
        }
        ModelCommand::Set { name } => {
            let mut config = Config::load();
            config.set_model(&name)?;
            // Readers re-resolve from config on their next call.
            cache.invalidate();
            println!("Active model set to {}", config.model());
            Ok(())
        }
        ModelCommand::List => {
            let client = build_client(cache)?;
            let models = llm::models::list_models(&client).await?;
            for model in models {
                println!("{}", model.name);
                if !model.display_name.is_empty() {
                    println!("  {}", model.display_name);
                }
                if !model.description.is_empty() {
                    println!("  {}", model.description);
                }
                println!(
                    "  input tokens: {}, output tokens: {}",
                    model.input_token_limit, model.output_token_limit
                );
            }
            Ok(())
        }
    }
}
