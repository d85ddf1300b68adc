use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use users_api::{startup, Settings, StartupError, UserStore};

#[derive(Parser, Debug)]
#[command(name = "users-api", version, about = "Create and list users over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Apply pending migrations before serving
        #[arg(long)]
        migrate: bool,
        /// Keep users in process memory instead of PostgreSQL
        #[arg(long, conflicts_with = "migrate")]
        in_memory: bool,
    },
    /// Apply pending schema migrations and exit
    Migrate,
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let settings = Settings::from_env()?;
    match cli.command {
        Command::Migrate => {
            startup::migrate(&settings).await?;
            Ok(())
        }
        Command::Serve { migrate, in_memory } => {
            let store: Arc<dyn UserStore> = if in_memory {
                Arc::new(startup::memory_store())
            } else {
                Arc::new(startup::postgres_store(&settings, migrate).await?)
            };
            startup::serve(&settings, store).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("users_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
