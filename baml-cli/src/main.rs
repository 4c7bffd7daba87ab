// CLI application
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "baml")]
#[command(about = "Bestiary Arena mod loader")]
#[command(version)]
struct Cli {
    /// Path to the persisted store (defaults to the per-user location)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the mod catalog with categories and enabled state
    List {
        /// Path to the mod pack directory (limits output to discovered mods)
        #[arg(short, long)]
        pack_dir: Option<PathBuf>,

        /// Include hidden mods in the listing
        #[arg(long)]
        all: bool,
    },
    /// Show mod counts per category
    Counts {
        /// Path to the mod pack directory
        #[arg(short, long)]
        pack_dir: PathBuf,
    },
    /// Bootstrap the page runtime and execute every enabled mod in order
    Run {
        /// Path to the mod pack directory
        #[arg(short, long)]
        pack_dir: PathBuf,
    },
    /// Execute a single mod by name
    Exec {
        /// Path to the mod pack directory
        #[arg(short, long)]
        pack_dir: PathBuf,

        /// Full mod name, e.g. "Super Mods/Autoseller.js"
        name: String,

        /// Execute even if the mod is disabled or already ran
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { pack_dir, all } => {
            commands::list_mods(cli.storage.as_deref(), pack_dir.as_deref(), all).await?;
        }
        Commands::Counts { pack_dir } => {
            commands::show_counts(cli.storage.as_deref(), &pack_dir).await?;
        }
        Commands::Run { pack_dir } => {
            let pb = create_progress_bar("Executing enabled mods...");
            let summary = commands::run_all(cli.storage.as_deref(), &pack_dir).await?;
            pb.finish_with_message(summary);
        }
        Commands::Exec {
            pack_dir,
            name,
            force,
        } => {
            let pb = create_progress_bar("Executing mod...");
            let summary = commands::exec_one(cli.storage.as_deref(), &pack_dir, &name, force).await?;
            pb.finish_with_message(summary);
        }
    }

    Ok(())
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb
}
