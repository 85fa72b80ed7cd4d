//! Command-line interface.
//!
//! Without a subcommand teumnirm runs the break reminder in the foreground.

pub mod config;
pub mod init;
pub mod lights;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the break reminder in the foreground (default)")]
    Run,
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "List Philips Hue lights or test the bridge connection")]
    Lights(lights::LightsArgs),
    #[command(about = "Print the effective configuration")]
    Config,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command.unwrap_or(Commands::Run) {
            Commands::Run => run::cmd().await,
            Commands::Init(args) => init::cmd(args),
            Commands::Lights(args) => lights::cmd(args).await,
            Commands::Config => config::cmd(),
        }
    }
}
