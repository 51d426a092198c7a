use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pagegate")]
#[command(
    about = "Static file server with a bounded number of concurrent handlers",
    long_about = None
)]
pub struct Cli {
    /// Port to listen on
    pub port: u16,

    /// Configuration file (defaults to $PAGEGATE_CONFIG or config/pagegate.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
