//! CLI module for cutvertex.
//!
//! Commands:
//! - analyze: load snapshot, reconcile, save, report
//! - detect: full detection only, nothing persisted

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::graph::{GraphStats, Vertex};
use crate::reconcile::ReconcileOutcome;

#[derive(Parser)]
#[command(name = "cutvertex")]
#[command(about = "Articulation points of an undirected graph, kept up to date across runs")]
pub struct Cli {
    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile the graph against its snapshot and report articulation points
    Analyze {
        /// Graph file: header `N M`, then one `u v` edge per line
        graph: PathBuf,

        /// Snapshot path (default: graph path with a .json extension)
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Also write a Graphviz rendering
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Run a full detection without touching any snapshot
    Detect {
        /// Graph file
        graph: PathBuf,

        /// Also write a Graphviz rendering
        #[arg(long)]
        dot: Option<PathBuf>,
    },
}

impl Cli {
    /// Default log filter for the verbosity flag.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// ─── Reporting ────────────────────────────────────────────────────

pub fn format_vertices(vertices: impl IntoIterator<Item = Vertex>) -> String {
    let items: Vec<String> = vertices.into_iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

pub fn print_graph_summary(stats: &GraphStats) {
    println!("Vertices: {}", stats.vertex_count);
    println!("Edges:    {}", stats.edge_count);
    if stats.isolated_count > 0 {
        println!("Isolated: {}", stats.isolated_count);
    }
}

pub fn print_outcome(outcome: &ReconcileOutcome, elapsed: Duration) {
    println!("Mode:       {}", outcome.mode);
    println!(
        "Articulation points: {}",
        format_vertices(outcome.articulation_points.iter().copied())
    );
    println!("Recomputed: {}", format_vertices(outcome.recomputed.iter().copied()));
    if outcome.saved {
        println!("Snapshot:   saved");
    } else {
        println!("Snapshot:   unchanged");
    }
    println!("Elapsed:    {:.3} ms", elapsed.as_secs_f64() * 1000.0);
}

pub fn print_detection(points: &BTreeSet<Vertex>, elapsed: Duration) {
    println!("Articulation points: {}", format_vertices(points.iter().copied()));
    println!("Elapsed:    {:.3} ms", elapsed.as_secs_f64() * 1000.0);
}
