use std::fs::OpenOptions;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use swipedia::app::AppContext;
use swipedia::cli::{commands, Cli, Commands};
use swipedia::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Feed);
    let interactive = matches!(command, Commands::Feed);

    init_tracing(interactive)?;

    let config = Config::load()?;
    let ctx = AppContext::new(cli.db, &config)?;

    match command {
        Commands::Feed => {
            swipedia::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
        Commands::Random { count } => {
            commands::random(&ctx, count, config.source.max_concurrency).await?;
        }
        Commands::Show { title } => {
            commands::show(&ctx, &title).await?;
        }
        Commands::Save { title } => {
            commands::save(&ctx, &title).await?;
        }
        Commands::Unsave { id } => {
            commands::unsave(&ctx, &id).await?;
        }
        Commands::Saved { search } => {
            commands::list_saved(&ctx, search.as_deref()).await?;
        }
        Commands::Prefs { theme, haptics } => {
            commands::prefs(&ctx, theme, haptics).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr, except under the TUI where they would corrupt the
/// screen and are appended to `swipedia.log` in the data directory instead.
fn init_tracing(interactive: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    if interactive {
        let path = Config::data_dir()?.join("swipedia.log");
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        registry
            .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    Ok(())
}
