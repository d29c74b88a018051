//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Object-graph behaviors: hierarchical aggregates, responsibility chains and prototype registries
#[derive(Parser, Debug)]
#[command(name = "patternkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.patternkit.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "PATTERNKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a file tree, remove entries and report sizes
    Composite {
        /// Entry to remove by name (repeatable)
        #[arg(short, long = "remove", default_values_t = vec!["banner.jpg".to_string()])]
        removals: Vec<String>,

        /// Draw the tree with box-drawing characters
        #[arg(long)]
        tree: bool,
    },

    /// Route spending requests through the approval chain
    Chain {
        /// Amount of a single request (default: run the sample batch)
        #[arg(short, long, requires = "description")]
        amount: Option<f64>,

        /// Description of the single request
        #[arg(short = 'm', long, requires = "amount")]
        description: Option<String>,
    },

    /// Spawn enemies from registered prototypes
    Prototype {
        /// Number of orcs in the wave
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..=64))]
        wave: u16,
    },

    /// Run all three demos in order
    All,

    /// Inspect settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings as TOML
    Show,
    /// Print config file locations
    Path,
}
