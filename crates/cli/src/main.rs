use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookstore catalog service administration
#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations, then serve HTTP until shutdown
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Load and validate configuration without connecting anywhere
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry).ok();

    match cli.command {
        Command::Serve => bookstore_app::serve(settings).await,
        Command::Migrate => {
            let applied = bookstore_app::migrate(&settings).await?;
            tracing::info!(applied, "migrate finished");
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::CheckConfig => {
            println!("environment: {}", settings.environment.as_str());
            println!("listen: {}", settings.server.bind_address());
            println!("database: {}", settings.database.redacted_url());
            Ok(())
        }
    }
}
