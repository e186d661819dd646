//! CLI command definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spaced-repetition review scheduler for flashcards
#[derive(Parser, Debug)]
#[command(name = "flashcards")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// User whose cards are scheduled (defaults to $FLASHCARDS_USER)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Treat this RFC 3339 instant as "now" instead of the system clock
    #[arg(long, global = true)]
    pub at: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a card; registering an existing card does nothing
    Register {
        collection: String,
        name: String,
        text: String,
    },

    /// Register every card of a JSON batch file
    Import {
        file: PathBuf,

        /// Collection to import into (defaults to the one named in the file)
        #[arg(short = 'C', long)]
        collection: Option<String>,
    },

    /// Write a collection's cards to a JSON batch file
    Export { collection: String, file: PathBuf },

    /// List the cards due for review
    Due { collection: String },

    /// Grade one card: 5=Very Easy, 4=Easy, 3=OK, 2=Hard, 1=Very Hard
    Review {
        collection: String,
        name: String,
        grade: u8,
    },

    /// Study the due cards of a collection interactively
    Study { collection: String },

    /// List the collections that hold cards
    Collections,

    /// List every card of a collection with its scheduling state
    Cards { collection: String },

    /// Show the review log of one card
    History { collection: String, name: String },
}
