use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "item-based book recommender")]
pub struct Cli {
    /// Path to the YAML configuration
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Clean the raw tables, build the similarity index and write all artifacts
    Train,
    /// Print the books most similar to a title
    Recommend {
        /// Exact book title
        #[arg(short, long)]
        title: String,
        /// Number of recommendations (defaults to model.k_default)
        #[arg(short)]
        k: Option<usize>,
    },
    /// List every title the trained model knows
    Titles,
    /// Start the recommendation server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}
