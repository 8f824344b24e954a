//! letterpress command line

#![forbid(unsafe_code)]

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{PreviewCommand, SendCommand, ServeCommand, TemplatesCommand, TransferCommand};
use letterpress::config::LetterpressConfig;

#[derive(Parser)]
#[command(name = "letterpress")]
#[command(version)]
#[command(about = "Staff-editable email templates", long_about = None)]
struct Cli {
    /// Config file to use instead of the standard locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin server
    Serve,
    /// List registered templates and their variables
    Templates,
    /// Render a stored template to stdout with sample data
    Preview {
        /// Template name
        name: String,
        /// Layout to render with instead of the stored one
        #[arg(long)]
        layout: Option<String>,
        /// JSON object of variable overrides
        #[arg(long)]
        variables: Option<String>,
    },
    /// Send a stored template through the configured backend
    Send {
        /// Template name
        name: String,
        /// Recipient mailbox
        recipient: String,
        /// JSON object of template arguments
        #[arg(long, default_value = "{}")]
        kwargs: String,
    },
    /// Write every stored template as JSON
    Export {
        /// Output file, stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Load templates from an export file
    Import {
        /// Export file
        file: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<LetterpressConfig> {
    path.map_or_else(LetterpressConfig::load, LetterpressConfig::load_from)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => ServeCommand::new(config).execute().await?,
        Commands::Templates => TemplatesCommand::execute()?,
        Commands::Preview {
            name,
            layout,
            variables,
        } => {
            PreviewCommand::new(name, layout, variables)
                .execute(config)
                .await?;
        }
        Commands::Send {
            name,
            recipient,
            kwargs,
        } => SendCommand::new(name, recipient, kwargs).execute(config).await?,
        Commands::Export { output } => TransferCommand::Export { output }.execute(config).await?,
        Commands::Import { file } => TransferCommand::Import { file }.execute(config).await?,
    }

    Ok(())
}
