use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripmate::config::{Config, LogFormat};
use tripmate::db::{Database, LibSqlBackend, TripStore};
use tripmate::llm::ModelGateway;
use tripmate::render::{Presenter, TerminalPresenter};
use tripmate::services::PlannerSession;

#[derive(Parser)]
#[command(name = "tripmate")]
#[command(about = "Plan trips by chatting with an AI assistant and keep the itineraries")]
struct Args {
    /// Database location (`file:<path>` or `:memory:`), overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive planning session (default)
    Chat,
    /// Print saved trips and exit
    Trips,
    /// Print one saved trip with its daily plans and exit
    Trip { id: i64 },
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tripmate=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    init_tracing(config.logging.format);

    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    tracing::info!(url = %config.database.url, "Opening trip database...");
    let database = Database::new(&config.database).await?;
    let store: Arc<dyn TripStore> = Arc::new(LibSqlBackend::new(database));
    let presenter: Arc<dyn Presenter> = Arc::new(TerminalPresenter::stdout());

    let command = args.command.unwrap_or(Command::Chat);

    // Listing trips works without a model, so only the chat session needs one.
    let gateway = match command {
        Command::Chat => match ModelGateway::initialize(&config.llm) {
            Ok(gateway) => gateway,
            Err(error) => {
                tracing::error!(error = %error, "Model gateway initialization failed");
                presenter.notify(&error.user_message());
                ModelGateway::uninitialized(&error.to_string())
            }
        },
        _ => ModelGateway::uninitialized("not needed for this command"),
    };

    let mut session = PlannerSession::new(gateway, store, presenter);

    match command {
        Command::Chat => {
            session.greet();
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            tripmate::repl::run(&mut session, stdin).await?;
        }
        Command::Trips => {
            session.show_trips().await?;
        }
        Command::Trip { id } => {
            if session.show_trip(id).await?.is_none() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
