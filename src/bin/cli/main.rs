mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mnema-cli", about = "Capture and review memories from the terminal", version)]
struct Cli {
    /// Use a specific data directory (default: per-user data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a new memory
    Capture {
        /// Front (question) text
        front: String,
        /// Back (answer) text; use "-" to read from stdin. Defaults to the
        /// surrounding text, then to the front text
        #[arg(long)]
        back: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Source URL
        #[arg(long)]
        url: Option<String>,
        /// Source page title
        #[arg(long)]
        title: Option<String>,
        /// Surrounding text of the capture
        #[arg(long)]
        surrounding: Option<String>,
    },

    /// List memories
    List {
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Show only memories due for review
        #[arg(long)]
        due: bool,
    },

    /// Run an interactive review session over the due set
    Review {
        /// Seed the session shuffle for a reproducible order
        #[arg(long)]
        seed: Option<u64>,
        /// Review at most N memories (oldest due first)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show collection statistics
    Stats,

    /// Delete a memory permanently
    Delete {
        /// Memory id
        id: String,
    },

    /// Archive a memory (kept, but excluded from review)
    Archive {
        /// Memory id
        id: String,
    },

    /// Export the full collection to a JSON file
    Export {
        /// Output path
        path: PathBuf,
    },

    /// Import a JSON export, replacing the current collection
    Import {
        /// Input path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let scheduler = commands::open_scheduler(cli.data_dir)?;

    match cli.command {
        Command::Capture { front, back, tags, url, title, surrounding } => {
            commands::capture(&scheduler, front, back, tags, url, title, surrounding).await?;
        }
        Command::List { tag, due } => {
            commands::list(&scheduler, tag.as_deref(), due).await?;
        }
        Command::Review { seed, limit } => {
            commands::review(&scheduler, seed, limit).await?;
        }
        Command::Stats => {
            commands::stats(&scheduler).await?;
        }
        Command::Delete { id } => {
            commands::delete(&scheduler, &id).await?;
        }
        Command::Archive { id } => {
            commands::archive(&scheduler, &id).await?;
        }
        Command::Export { path } => {
            commands::export(&scheduler, &path).await?;
        }
        Command::Import { path } => {
            commands::import(&scheduler, &path).await?;
        }
    }

    Ok(())
}
