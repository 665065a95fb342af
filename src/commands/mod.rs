pub mod delete;
pub mod register;
pub mod validate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// A client to support interactions with a DANDI archive instance
#[derive(Parser)]
#[command(name = "dandi", version, about)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete Dandisets and assets from the server
    Delete(delete::DeleteArgs),
    /// Create a new Dandiset on the server
    Register(register::RegisterArgs),
    /// Validate local Dandiset files and layout
    Validate(validate::ValidateArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let filter = EnvFilter::new(&self.log_level);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();

        match self.command {
            Commands::Delete(args) => args.run().await,
            Commands::Register(args) => args.run().await,
            Commands::Validate(args) => args.run(),
        }
    }
}
