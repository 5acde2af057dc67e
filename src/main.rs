use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskgate::config::ServerConfig;
use taskgate::consts::{DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_PORT, VERSION};
use taskgate::engine::Engine;
use taskgate::engine::dispatch::DispatchEngine;
use taskgate::handlers::{HandlerRegistry, TaskReply};
use taskgate::server;

#[derive(Parser)]
#[command(name = "taskgate", version, about = "Run file tasks from plain-English requests.")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "TASKGATE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "TASKGATE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Shared data root all handlers read from and write to
    #[arg(short, long, env = "TASKGATE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Run a single task and exit instead of serving HTTP
    #[arg(short, long)]
    run: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        data_dir: cli.data_dir,
    };

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;

    let registry = Arc::new(HandlerRegistry::builtin(&config.data_dir));
    for (i, binding) in registry.describe().iter().enumerate() {
        info!(order = i, handler = %binding.name, trigger = %binding.trigger, "registered");
    }
    info!(handlers = registry.len(), "routing table ready");
    let engine = Arc::new(DispatchEngine::new(registry));

    // Single task mode
    if let Some(task) = cli.run {
        let reply = engine.run(&task).await.unwrap_or_else(TaskReply::from);
        println!("[{}] {}", reply.status, reply.message);
        return Ok(if reply.status == 200 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    info!(version = VERSION, data_dir = %config.data_dir.display(), "starting taskgate");
    server::serve(engine, &config.bind_addr()).await?;
    Ok(ExitCode::SUCCESS)
}
