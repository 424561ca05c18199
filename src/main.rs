use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gazette::app::AppContext;
use gazette::cli::{commands, Cli, Commands};
use gazette::view::StatusTag;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config)?;

    let status = match cli.command {
        Commands::Views => {
            commands::list_views(&ctx)?;
            StatusTag::Loaded
        }
        Commands::Feed { category, json } => commands::show_feed(&ctx, &category, json).await?,
        Commands::Front { json } => commands::show_front(&ctx, json).await?,
        Commands::Show { id, json } => commands::show_article(&ctx, &id, json).await?,
    };

    if status == StatusTag::Failed {
        std::process::exit(1);
    }

    Ok(())
}
