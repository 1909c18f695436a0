//! instructions CLI: run the API server or work with stored instructions.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use instructions_api::api::cors::cors_layer;
use instructions_api::api::{AppState, router};
use instructions_api::config::secrets::{ExposeSecret, presence};
use instructions_api::config::{Config, EnvPresence};
use instructions_api::db::Db;
use instructions_api::model::{NewStep, NewWorkInstruction, RecordId};
use instructions_api::service::InstructionService;
use instructions_api::store::{DocumentStore, MemoryStore};
use instructions_api::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "instructions", about = "Work instructions service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Keep documents in process memory instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },
    /// Work instruction operations against the configured database
    Instruction {
        #[command(subcommand)]
        action: InstructionAction,
    },
}

#[derive(Subcommand)]
enum InstructionAction {
    /// List all work instructions
    List,
    /// Show one work instruction with its steps
    Show {
        /// Instruction ID (full UUID or prefix)
        id: String,
    },
    /// Create a work instruction
    Create {
        /// Instruction title
        title: String,
        /// Step as "title" or "title:description", in order; repeatable
        #[arg(long = "step")]
        steps: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve { in_memory } => cmd_serve(config, in_memory).await,
        Command::Instruction { action } => {
            let Some(ref url) = config.database_url else {
                anyhow::bail!("DATABASE_URL must be set for instruction commands");
            };
            let db = Db::connect_lazy(
                url.expose_secret(),
                config.database_name.as_deref(),
                config.max_connections,
            )?;
            db.migrate().await?;
            let service = InstructionService::new(Arc::new(db));

            match action {
                InstructionAction::List => cmd_list(&service).await,
                InstructionAction::Show { id } => cmd_show(&service, id).await,
                InstructionAction::Create { title, steps } => {
                    cmd_create(&service, title, steps).await
                }
            }
        }
    }
}

async fn cmd_serve(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "instructions-api".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let store: Option<Arc<dyn DocumentStore>> = if in_memory {
        tracing::info!("using in-memory document store");
        Some(Arc::new(MemoryStore::new()))
    } else if let Some(ref url) = config.database_url {
        let db = Db::connect_lazy(
            url.expose_secret(),
            config.database_name.as_deref(),
            config.max_connections,
        )?;
        // The pool is lazy; an unreachable database shows up in /test.
        match db.health_check().await {
            Ok(()) => {
                if let Err(e) = db.migrate().await {
                    tracing::warn!(error = %e, "migrations not applied");
                }
            }
            Err(e) => tracing::warn!(error = %e, "database unreachable at startup"),
        }
        Some(Arc::new(db))
    } else {
        tracing::warn!("DATABASE_URL not set; instruction routes will fail");
        None
    };

    let state = AppState::new(store, EnvPresence::from_env());
    let app = router(state, cors_layer(config.cors_allow_credentials));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        database_url = presence(config.database_url.as_ref()),
        "work instructions API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}

async fn cmd_list(service: &InstructionService) -> anyhow::Result<()> {
    let items = service.list().await?;

    if items.is_empty() {
        println!("No work instructions found.");
        return Ok(());
    }

    println!("{:<8}  TITLE", "ID");
    println!("{}", "-".repeat(60));
    for item in &items {
        println!("{:<8}  {}", item.id.short(), item.title);
    }

    println!("\n{} instruction(s)", items.len());
    Ok(())
}

async fn cmd_show(service: &InstructionService, id_str: String) -> anyhow::Result<()> {
    // Full ids are used as-is; anything else is a prefix of a listed id
    let id = match id_str.parse::<RecordId>() {
        Ok(id) => id,
        Err(_) => {
            let items = service.list().await?;
            RecordId::resolve(&id_str, items.iter().map(|item| item.id))?
        }
    };

    let instruction = service.get(id).await?;

    println!("ID:     {}", instruction.id);
    println!("Title:  {}", instruction.title);
    println!("Steps:  {}", instruction.steps.len());
    for step in &instruction.steps {
        println!("  {:>3}. {}", step.order + 1, step.title);
        if !step.description.is_empty() {
            println!("       {}", step.description);
        }
    }
    Ok(())
}

async fn cmd_create(
    service: &InstructionService,
    title: String,
    steps: Vec<String>,
) -> anyhow::Result<()> {
    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_step_arg(raw, i as u64))
        .collect();

    let summary = service
        .create(NewWorkInstruction::new(title).steps(steps))
        .await?;
    println!("Created: {} ({})", summary.id, summary.title);
    Ok(())
}

/// "title" or "title:description".
fn parse_step_arg(raw: &str, order: u64) -> NewStep {
    match raw.split_once(':') {
        Some((title, description)) => {
            NewStep::new(title.trim(), order).description(description.trim())
        }
        None => NewStep::new(raw.trim(), order),
    }
}
