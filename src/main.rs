use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kindling::app::AppContext;
use kindling::cli::{commands, Cli, Commands};
use kindling::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.db)?;
    let settings = Settings::load().unwrap_or_else(|err| {
        tracing::warn!("failed to load settings, using defaults: {err}");
        Settings::default()
    });

    match cli.command {
        Some(Commands::List { category }) => {
            commands::list(&ctx, category).await?;
        }
        Some(Commands::Bookmarks) => {
            commands::bookmarks(&ctx)?;
        }
        Some(Commands::Save { id }) => {
            commands::save(&ctx, id).await?;
        }
        Some(Commands::Remove { id }) => {
            commands::remove(&ctx, id)?;
        }
        Some(Commands::Read { id }) => {
            commands::read(&ctx, id)?;
        }
        Some(Commands::Tui) | None => {
            kindling::tui::run(Arc::new(ctx), settings).await?;
        }
    }

    Ok(())
}
