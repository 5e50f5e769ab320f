use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod data;
mod expr_parse;
mod output;

/// Supply Planning Engine CLI: a thin, direct-JSON-only harness over the
/// core (§10.3). Real OKH/OKW ingestion is out of scope (§1).
#[derive(Parser)]
#[command(name = "spc")]
#[command(about = "Supply Planning Engine CLI")]
#[command(version)]
struct Cli {
    /// Catalog JSON file.
    #[arg(short, long, value_name = "FILE")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate every supply tree for a product, one per line.
    Plan {
        /// Atom identifier of the product to plan for.
        product: String,
        /// Output format: "json" (default) or "text".
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Print the minimum-cost complete supply tree for a product.
    Price {
        /// Atom identifier of the product to price.
        product: String,
        /// Output format: "json" (default) or "text".
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Load and validate the catalog without planning.
    Validate,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let catalog = match data::load_catalog(&cli.catalog) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{} {err:#}", "catalog error:".red().bold());
            return ExitCode::from(3);
        }
    };

    let result = match &cli.command {
        Commands::Plan { product, format } => commands::plan::execute(&catalog, product, format),
        Commands::Price { product, format } => commands::price::execute(&catalog, product, format),
        Commands::Validate => commands::validate::execute(&catalog),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
