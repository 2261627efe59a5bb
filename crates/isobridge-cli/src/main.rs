//! isobridge CLI - Bridge stub generator
//!
//! Commands:
//! - `isobridge generate` - Generate start/end point sources for a round
//! - `isobridge check` - Validate a round without writing anything

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod generate;
mod logging;
mod writer;

#[derive(Parser)]
#[command(name = "isobridge")]
#[command(author, version, about = "Generates isolate bridge stubs", long_about = None)]
struct Cli {
    /// Path to isobridge.toml (default: ./isobridge.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bridge sources for a round description
    Generate {
        /// Round description (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (default: [generator] output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comment placed at the top of every generated source
        #[arg(long)]
        header: Option<String>,

        /// Skip provider listings for process services
        #[arg(long)]
        no_registrations: bool,
    },

    /// Validate a round description without generating anything
    Check {
        /// Round description (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = generate::load_config(cli.config.as_deref())?;
    let filter = logging::resolve_filter(
        cli.log_level.as_deref(),
        std::env::var("RUST_LOG").ok(),
        &config,
    )?;
    logging::init(&filter);

    let report = match cli.command {
        Commands::Generate {
            input,
            output,
            header,
            no_registrations,
        } => {
            let options = generate::GenerateOptions {
                input,
                output,
                header,
                no_registrations,
            };
            generate::run(&options, &config)?
        }
        Commands::Check { input, json } => generate::check(&input, &config, json)?,
    };
    generate::ensure_clean(&report)?;

    Ok(())
}
