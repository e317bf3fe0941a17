mod app;
mod config;
mod handlers;
mod output;
mod state;
mod storage;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itemstack_core::resolver::ResolverEngine;
use itemstack_core::schema;
use itemstack_core::stack::{assemble, Environment, Stack, StackConfig};
use itemstack_core::templates::UuidIds;

use crate::{app::create_app, config::Config, state::AppState};

/// itemstack - Describe an AppSync items API backed by DynamoDB
#[derive(Parser, Debug)]
#[command(name = "itemstack")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    stack: StackArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct StackArgs {
    /// Name of the CloudFormation stack
    #[arg(long, global = true, default_value = "ItemsStack", env = "STACK_NAME")]
    stack_name: String,

    /// Target AWS account
    #[arg(long, global = true, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    /// Target AWS region
    #[arg(long, global = true, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,
}

impl StackArgs {
    fn config(&self) -> StackConfig {
        StackConfig::default()
            .with_stack_name(&self.stack_name)
            .with_environment(Environment::new(self.account.clone(), self.region.clone()))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Emit the CloudFormation template
    Synth {
        /// Write the template to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show resources in creation order with their dependencies
    Plan,

    /// Print the GraphQL schema definition
    Schema,

    /// Run a local emulator of the GraphQL API
    Serve {
        /// Host address to bind the server to
        #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, short, default_value = "3000", env = "PORT")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `synth` output can be piped.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itemstack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let stack_config = cli.stack.config();
    let stack = assemble(&stack_config).context("failed to assemble the stack")?;

    tracing::debug!(
        stack = %stack_config.stack_name,
        resources = stack.resources().len(),
        "Stack assembled"
    );

    match cli.command {
        Command::Synth { output, compact } => synth(&stack, output, compact),
        Command::Plan => output::print_plan(&stack),
        Command::Schema => {
            anstream::print!("{}", schema::definition(&stack_config.table_name));
            Ok(())
        }
        Command::Serve { host, port } => serve(&stack, &host, port).await,
    }
}

fn synth(stack: &Stack, output: Option<PathBuf>, compact: bool) -> Result<()> {
    let template = if compact {
        serde_json::to_string(&stack.to_template()?)?
    } else {
        stack.to_json_pretty()?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{template}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Template written");
        }
        None => anstream::println!("{template}"),
    }
    Ok(())
}

async fn serve(stack: &Stack, host: &str, port: u16) -> Result<()> {
    let config = Config::from_env();

    let key_attribute = stack
        .table()
        .and_then(|(_, table)| table.partition_key())
        .map(|(name, _)| name.to_string())
        .context("stack has no table partition key")?;

    let store = storage::create_store(&config, &key_attribute).await?;
    let engine = ResolverEngine::from_stack(stack, store, Arc::new(UuidIds));
    let state = AppState::new(engine);

    let app = create_app(state, config.request_timeout());

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => {
            let addr = format!("{host}:{port}");
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
