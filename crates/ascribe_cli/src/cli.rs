//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ascribe - render AsciiDoc documents and derived views
#[derive(Parser)]
#[command(name = "ascribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Options file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the rendered HTML of a document
    Render {
        /// AsciiDoc file
        file: PathBuf,
    },

    /// Print the heading outline as JSON
    Headings {
        /// AsciiDoc file
        file: PathBuf,

        /// Only list headings of this depth (0 is the document title)
        #[arg(short, long)]
        depth: Option<u8>,

        /// Keep inline HTML in heading values
        #[arg(long)]
        keep_tags: bool,
    },

    /// Print the estimated reading time in minutes
    TimeToRead {
        /// AsciiDoc file
        file: PathBuf,

        /// Reading speed in words per minute
        #[arg(short, long)]
        speed: Option<u32>,
    },

    /// Print the created node as JSON
    Transform {
        /// AsciiDoc file
        file: PathBuf,
    },
}
