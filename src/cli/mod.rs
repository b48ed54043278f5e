pub mod commands;

use clap::{Parser, Subcommand};

use crate::domain::FeedKind;

#[derive(Parser)]
#[command(name = "kindling")]
#[command(about = "A terminal Hacker News reader with local bookmarks", long_about = None)]
pub struct Cli {
    /// Path to the bookmark database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the first page of a feed category
    List {
        /// Feed category: top, new, best, ask, show, job, bookmarks
        #[arg(short, long, default_value = "top")]
        category: FeedKind,
    },
    /// List saved bookmarks
    Bookmarks,
    /// Bookmark a story by id
    Save {
        /// Story id
        id: i64,
    },
    /// Remove a bookmark
    Remove {
        /// Story id
        id: i64,
    },
    /// Toggle a bookmark's read flag
    Read {
        /// Story id
        id: i64,
    },
    /// Launch the TUI (the default when no subcommand is given)
    Tui,
}
