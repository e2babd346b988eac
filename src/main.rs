//! # docchat CLI
//!
//! The `docchat` binary indexes plain-text files, searches them with a
//! deterministic lexical scorer, and runs retrieval-augmented chat turns
//! against an OpenRouter model.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat init` | Create the SQLite database and run schema migrations |
//! | `docchat index <files>...` | Chunk and index plain-text files |
//! | `docchat list` | List indexed documents |
//! | `docchat remove <id>` | Remove a document from the index |
//! | `docchat search "<query>"` | Rank indexed chunks against a query |
//! | `docchat chat [message]` | One chat turn, or an interactive loop |
//! | `docchat rules show\|set\|clear` | Manage custom instructions |
//! | `docchat key set\|clear\|status` | Manage the OpenRouter API key |
//! | `docchat serve` | Start the file-storage HTTP service |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! docchat init
//!
//! # Index some notes
//! docchat index notes.txt meeting.txt
//!
//! # Inspect what retrieval would attach
//! docchat search "quarterly budget"
//!
//! # Ask a question with file context
//! docchat key set sk-or-...
//! docchat chat "what did we decide about the budget?"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docchat::{chat, config, ingest, migrate, search, server, settings};

/// docchat CLI — chat with your plain-text files through a local index
/// and an OpenRouter model.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docchat.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "docchat — index plain-text files and chat with them via OpenRouter",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docchat.toml`. Database, chunking, retrieval,
    /// model, and server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the key-value table backing
    /// the document index and settings. Idempotent.
    Init,

    /// Chunk and index plain-text files.
    ///
    /// Each file is split into sentence-boundary chunks, uploaded to the
    /// file-storage service when it is reachable, and recorded in the
    /// index. Non-.txt files are skipped with a notice; re-indexing a
    /// file name replaces the previous record.
    Index {
        /// Paths of the .txt files to index.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List indexed documents.
    List,

    /// Remove a document from the index.
    ///
    /// Also attempts to delete the stored copy from the file-storage
    /// service; a storage failure is logged and does not block removal.
    Remove {
        /// Document id as shown by `docchat list`.
        id: String,
    },

    /// Rank indexed chunks against a query.
    ///
    /// Prints the same context entries a chat turn would attach, with
    /// their relevance scores.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run a retrieval-augmented chat turn.
    ///
    /// With a message argument, answers once and exits. Without one,
    /// reads messages from stdin until an empty line.
    Chat {
        /// The message to send. Omit for an interactive loop.
        message: Option<String>,

        /// Override the model from config for this invocation.
        #[arg(long)]
        model: Option<String>,
    },

    /// Manage the custom instructions prepended to every chat turn.
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage the stored OpenRouter API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Start the file-storage HTTP service.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// upload, list, and delete endpoints used by `docchat index`.
    Serve,
}

/// Custom-instruction subcommands.
#[derive(Subcommand)]
enum RulesAction {
    /// Print the current custom instructions.
    Show,
    /// Replace the custom instructions.
    Set {
        /// The instruction text.
        text: String,
    },
    /// Delete the custom instructions.
    Clear,
}

/// API key subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Store the OpenRouter API key.
    Set {
        /// The key (usually starts with `sk-or-`).
        key: String,
    },
    /// Delete the stored key.
    Clear,
    /// Show whether a key is configured and where it would come from.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index { files } => {
            ingest::run_index(&cfg, &files).await?;
        }
        Commands::List => {
            ingest::run_list(&cfg).await?;
        }
        Commands::Remove { id } => {
            ingest::run_remove(&cfg, &id).await?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
        Commands::Chat { message, model } => {
            chat::run_chat(&cfg, message, model).await?;
        }
        Commands::Rules { action } => match action {
            RulesAction::Show => settings::run_rules_show(&cfg).await?,
            RulesAction::Set { text } => settings::run_rules_set(&cfg, &text).await?,
            RulesAction::Clear => settings::run_rules_clear(&cfg).await?,
        },
        Commands::Key { action } => match action {
            KeyAction::Set { key } => settings::run_key_set(&cfg, &key).await?,
            KeyAction::Clear => settings::run_key_clear(&cfg).await?,
            KeyAction::Status => settings::run_key_status(&cfg).await?,
        },
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
