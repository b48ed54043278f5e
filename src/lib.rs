//! # Kindling
//!
//! A terminal Hacker News reader with offline bookmarks.
//!
//! ## Architecture
//!
//! ```text
//! Client → FeedController → Store
//!        ↘ CommentTree   ↗
//!              TUI
//! ```
//!
//! - [`client`]: Firebase HTTP client with in-flight request coalescing
//! - [`feed`]: Feed loading, pagination, sorting, bookmark orchestration
//! - [`comments`]: Lazily loaded, collapsible comment tree
//! - [`store`]: SQLite bookmark persistence
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Browse the front page
//! kindling list top
//!
//! # Save a story for later
//! kindling save 8863
//!
//! # Show saved stories
//! kindling bookmarks
//!
//! # Launch TUI
//! kindling tui
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`client`]: Hacker News API client
//! - [`comments`]: Comment tree state machine
//! - [`config`]: User settings persistence
//! - [`domain`]: Core domain models (Item, Bookmark, FeedKind)
//! - [`feed`]: Feed controller
//! - [`store`]: SQLite persistence layer
//! - [`tui`]: Terminal user interface

pub mod app;
pub mod cli;
pub mod client;
pub mod comments;
pub mod config;
pub mod domain;
pub mod feed;
pub mod store;
pub mod tui;
