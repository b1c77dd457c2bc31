//! motifscope CLI tool
//!
//! Command-line interface for decomposing assembly graphs with motifscope-core.
//!
//! ## Commands
//!
//! - `decompose <graph.json>`: Decompose a graph and print its ranked components
//! - `config`: Print the decomposition configuration as TOML

use clap::{Parser, Subcommand};
use motifscope_core::{
    components::Components,
    config::{ConfigProvider, DecomposeConfig, TomlConfigProvider},
    decompose::decompose,
    graph::GraphInput,
};
use serde_json::json;
use std::{fs::read_to_string, path::PathBuf};

#[derive(Parser)]
#[command(name = "motifscope")]
#[command(author, version, about = "Decompose assembly graphs into nested motifs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a graph and print its components, largest first
    Decompose {
        /// Path to a JSON graph description (`nodes` and `edges`)
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the summary and components as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Only report this component (1 is the largest)
        #[arg(long)]
        component: Option<usize>,
    },

    /// Print the configuration a decomposition would use
    Config {
        /// Configuration file path; defaults are printed when omitted or missing
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<DecomposeConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => TomlConfigProvider::new(path).get_config()?,
        None => DecomposeConfig::default(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decompose {
            path,
            config,
            json,
            component,
        } => {
            let config = load_config(config)?;
            let input = GraphInput::from_json_str(&read_to_string(&path)?)?;
            let (graph, summary) = decompose(input, &config)?;
            let components = Components::record(&graph)?;

            let selected = match component {
                Some(number) => Components(vec![components.get(number)?.clone()]),
                None => components,
            };
            if json {
                let report = json!({
                    "summary": summary,
                    "components": selected,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: {} patterns, {} split nodes, {} components",
                    path.display(),
                    summary.patterns.total(),
                    summary.split_nodes,
                    selected.len()
                );
                print!("{}", selected.render_table()?);
            }
        }

        Commands::Config { config } => {
            let config = load_config(config)?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
