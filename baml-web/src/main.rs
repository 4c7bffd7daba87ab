mod routes;
mod security;
mod server;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "baml-web")]
#[command(about = "Serve a mod pack directory the way the extension package origin does")]
#[command(version)]
struct Cli {
    /// Mod pack directory to serve
    #[arg(short, long, default_value = "mods")]
    pack_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let server = server::PackServer::new(cli.pack_dir)?;
    server.run().await
}
