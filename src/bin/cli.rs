//! cutvertex CLI
//!
//! Usage:
//!   cutvertex analyze data/example_graph.txt
//!   cutvertex detect data/example_graph.txt --dot graph.dot

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cutvertex::cli::{print_detection, print_graph_summary, print_outcome, Cli, Commands};
use cutvertex::render::write_dot;
use cutvertex::{analyze, detect, read_graph, CutVertexConfig};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports and --json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = CutVertexConfig::load(&cli.config);

    match cli.command {
        Commands::Analyze {
            graph: graph_path,
            state,
            json,
            dot,
        } => {
            let graph = read_graph(&graph_path)
                .with_context(|| format!("reading {}", graph_path.display()))?;
            let state_path = state.unwrap_or_else(|| config.resolve_state_path(&graph_path));

            let start = Instant::now();
            let outcome = analyze(&graph, &state_path, &config)
                .with_context(|| format!("reconciling with {}", state_path.display()))?;
            let elapsed = start.elapsed();

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_graph_summary(&graph.stats());
                println!();
                print_outcome(&outcome, elapsed);
            }

            if let Some(dot_path) = dot {
                write_dot(&dot_path, &graph, &outcome.articulation_points, &outcome.recomputed)?;
                eprintln!("Wrote {}", dot_path.display());
            }
        }

        Commands::Detect {
            graph: graph_path,
            dot,
        } => {
            let graph = read_graph(&graph_path)
                .with_context(|| format!("reading {}", graph_path.display()))?;

            let start = Instant::now();
            let detection = detect(&graph);
            let elapsed = start.elapsed();

            print_graph_summary(&graph.stats());
            println!();
            print_detection(&detection.articulation_points, elapsed);

            if let Some(dot_path) = dot {
                write_dot(&dot_path, &graph, &detection.articulation_points, &[])?;
                eprintln!("Wrote {}", dot_path.display());
            }
        }
    }

    Ok(())
}
