//! CLI argument parsing for selt.

use clap::{Parser, Subcommand};
use seltmodel::export::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "selt",
    about = "Track files attached to a SELT model and export its diagram graph",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/selt/logs/selt.log"
)]
pub struct Cli {
    /// Path to the model directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new model store in the model directory
    Init,

    /// Attach a file to the model
    Attach {
        /// File to attach
        file: PathBuf,
    },

    /// List attached files
    Files {
        /// Only show files flagged as modified
        #[arg(short, long)]
        modified: bool,
    },

    /// Show an attached file and its timestamps
    Show {
        /// File reference ID
        id: String,
    },

    /// Remove a file reference (the file itself is kept)
    Detach {
        /// File reference ID
        id: String,
    },

    /// Flag attached files that changed or disappeared
    Reconcile {
        /// Model file that was saved; attached paths resolve against its directory
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Accept the current state of an attached file
    Ack {
        /// File reference ID
        id: String,
    },

    /// Add or remove diagram elements
    Node {
        #[command(subcommand)]
        command: NodeCommand,
    },

    /// List diagram elements
    Nodes,

    /// Add or remove dependencies
    Edge {
        #[command(subcommand)]
        command: EdgeCommand,
    },

    /// Import nodes and edges from a YAML or JSON document
    Import {
        /// Model document
        file: PathBuf,
    },

    /// Export the graph (json, adjacency) or category links (csv, tsv, txt)
    Export {
        /// Output format (default: json, or the configured table format when categories are given)
        format: Option<ExportFormat>,

        /// Output file (default: export.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Category where links start
        #[arg(short = 's', long)]
        source_category: Option<String>,

        /// Category where links end
        #[arg(short = 't', long)]
        target_category: Option<String>,

        /// Longest chain of edges to follow
        #[arg(long)]
        max_hops: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum NodeCommand {
    /// Add a node
    Add {
        /// Node name
        name: String,

        /// Category (stereotype), e.g. Person, Container
        #[arg(short, long)]
        category: String,

        /// Description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Nest the node inside this parent
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Remove a node and its edges
    Rm {
        /// Node name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum EdgeCommand {
    /// Add a dependency from source to target
    Add {
        source: String,
        target: String,

        /// Edge label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Remove all dependencies from source to target
    Rm { source: String, target: String },
}
