//! Lectern CLI - ask a language model about a passage of a book.

mod repl;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use lectern_core::{BookInfo, Config, Conversation, ProviderRegistry, TomlPreferenceStore};

/// Lectern CLI - chat about a passage of a book
#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Title of the book
    #[arg(short, long)]
    title: Option<String>,

    /// Author of the book
    #[arg(short, long)]
    author: Option<String>,

    /// Primary language of the book (e.g. "en")
    #[arg(short, long)]
    language: Option<String>,

    /// Selected passage (asked for on stdin if not provided)
    #[arg(short, long)]
    selection: Option<String>,

    /// File holding the text of the current page
    #[arg(long)]
    page_file: Option<PathBuf>,

    /// Provider for this session (not saved as the standing preference)
    #[arg(short = 'p', long)]
    provider: Option<String>,

    /// Model for this session (not saved as the standing preference)
    #[arg(short = 'm', long)]
    model: Option<String>,
}

impl Args {
    fn book(&self) -> BookInfo {
        BookInfo {
            title: self.title.clone(),
            author: self.author.clone(),
            language: self.language.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load().unwrap_or_default();
    let registry = ProviderRegistry::init_global(&config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let selection = match args.selection.clone() {
        Some(selection) => selection,
        None => read_selection(&mut lines)
            .await
            .context("Failed to read selection")?,
    };
    if selection.trim().is_empty() {
        bail!("No selection provided");
    }

    let mut conversation =
        Conversation::new(Arc::clone(&registry), args.book(), selection).with_config(&config);
    if let Some(store) = TomlPreferenceStore::user_default() {
        conversation = conversation.with_preferences(Arc::new(store));
    }
    if let Some(ref path) = args.page_file {
        let page = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page file {}", path.display()))?;
        conversation = conversation.with_page_text(page);
    }

    // Apply session overrides from CLI flags
    if let Some(ref provider) = args.provider {
        conversation = conversation.with_provider(provider);
    }
    if let Some(ref model) = args.model {
        conversation = conversation.with_model(model);
    }
    conversation.set_credential(config.credential_for(conversation.provider()));

    repl::run(&config, conversation, lines).await
}

/// Read the selected passage as the first line of stdin.
async fn read_selection(lines: &mut Lines<BufReader<Stdin>>) -> io::Result<String> {
    if io::stdin().is_terminal() {
        print!("Selected text: ");
        io::stdout().flush()?;
    }

    Ok(lines.next_line().await?.unwrap_or_default())
}
