mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "porthole", about = "Circular crop tool for large images")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show source dimensions and the fitted view
    Info(commands::info::InfoArgs),
    /// Decode the circular crop square to PNG
    Crop(commands::crop::CropArgs),
    /// Render the composited viewport preview to PNG
    Preview(commands::preview::PreviewArgs),
    /// Print or save the default engine config as TOML
    Config(commands::config::ConfigArgs),
    /// Convert an image into the raw region-decode container
    Pack(commands::pack::PackArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Crop(args) => commands::crop::run(args),
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Pack(args) => commands::pack::run(args),
    }
}
