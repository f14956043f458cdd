mod cli;

use clap::Parser;
use cli::{Cli, load_prompt};
use ensemble_core::agent::AgentDirectory;
use ensemble_core::config::AppConfig;
use ensemble_core::domain::context::CallContext;
use ensemble_core::model::create_provider;
use ensemble_core::tooling::ToolRegistry;
use ensemble_core::types::AgentInput;
use ensemble_session::{FileTaskStore, SessionManager};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    info!("Starting ensemble");
    debug!(config = ?cli.config, agent = ?cli.agent, session = %cli.session, task = ?cli.task, "CLI arguments parsed");

    let config = AppConfig::load(cli.config.as_deref())?;
    let prompt = load_prompt(&cli)?;

    let registry = Arc::new(ToolRegistry::with_inbuilt_tools()?);
    let provider = create_provider(&config.provider)?;
    info!(provider = provider.id(), model = %config.provider.model, "Model provider ready");

    let directory = AgentDirectory::new(
        config.agents.clone(),
        provider,
        registry,
        config.agent_options(),
    );
    let agent_name = cli
        .agent
        .clone()
        .unwrap_or_else(|| config.default_agent.clone());
    let agent = directory.build(&agent_name)?;

    let store_dir = cli
        .store_dir
        .clone()
        .unwrap_or_else(|| config.store_dir.clone());
    debug!(path = %store_dir.display(), "Using session store");
    let sessions = SessionManager::new(Arc::new(FileTaskStore::new(store_dir)));

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());
    let ctx = CallContext::with_cancellation(cancellation);

    let input = cli.labels.iter().fold(
        AgentInput::text(prompt).with_session(cli.session.clone()),
        |input, (key, value)| input.with_label(key, value),
    );

    match sessions.run_turn(&ctx, &agent, input, cli.task).await {
        Ok(outcome) => {
            let report = json!({
                "session": cli.session,
                "agent": agent_name,
                "task_id": outcome.task_id,
                "status": outcome.status,
                "response": outcome.output.text,
                "stats": outcome.output.stats,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Turn failed");
            eprintln!("{}", err.user_message());
            Err(err.into())
        }
    }
}

fn spawn_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling the current turn");
            cancellation.cancel();
        }
    });
}

fn init_tracing(quiet: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = if quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
