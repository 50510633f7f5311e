// dealdesk server binary

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dealdesk::artifacts::ArtifactStore;
use dealdesk::config::AppConfig;
use dealdesk::provider::HttpInteractionClient;
use dealdesk::server::{run_server, AuthState, EventBroadcaster, ServerAppState};
use dealdesk::workflow::WorkflowContext;

#[derive(Parser)]
#[command(
    name = "dealdesk",
    version,
    about = "Plan / deep-research / analysis workflow server"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the workflow server
    Serve {
        #[arg(long, default_value_t = 4174)]
        port: u16,

        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Allowed CORS origin (repeatable); any origin when omitted
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,

        /// Directory for chart/report/infographic artifacts
        #[arg(long)]
        outputs_dir: Option<PathBuf>,

        /// Seconds between research status polls
        #[arg(long)]
        poll_interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            cors_origins,
            outputs_dir,
            poll_interval,
        } => serve(port, bind, cors_origins, outputs_dir, poll_interval).await,
    }
}

async fn serve(
    port: u16,
    bind: String,
    cors_origins: Vec<String>,
    outputs_dir: Option<PathBuf>,
    poll_interval: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;

    if let Some(dir) = outputs_dir {
        config.outputs_dir = dir;
    }
    if let Some(secs) = poll_interval {
        config.poll.interval = Duration::from_secs(secs);
    }

    config.validate()?;

    let artifacts = ArtifactStore::open(&config.outputs_dir).map_err(|e| anyhow!(e))?;
    let client = Arc::new(HttpInteractionClient::new(
        config.provider_base_url.clone(),
        config.api_key.clone(),
    ));
    let auth = AuthState::new(config.app_password.clone());

    let config = Arc::new(config);
    let workflow = WorkflowContext {
        config,
        client,
        artifacts: Arc::new(artifacts),
        broadcaster: Arc::new(EventBroadcaster::new()),
    };

    let state = ServerAppState::new(auth, workflow);

    let cors = if cors_origins.is_empty() {
        None
    } else {
        Some(cors_origins)
    };

    run_server(port, &bind, state, cors)
        .await
        .map_err(|e| anyhow!(e))
}
