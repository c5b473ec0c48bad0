//! Tekton Pipeline Explorer
//!
//! Terminal front-end: prints the resource tree and dispatches describe/logs/start/cancel/delete
//! actions to `tkn`, prompting for any resource not named on the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use tekton_explorer::resolver::Outcome;
use tekton_explorer::terminal::{self, TerminalHost};
use tekton_explorer::{commands, Action, AppContext, Host, ResourceNode};
use tekton_shared::{ExplorerConfig, LoggingConfig};

const DEFAULT_CONFIG_PATH: &str = "tekton-explorer.json";

#[derive(Parser)]
#[command(name = "tekton-explorer", version, about = "Browse and operate Tekton resources")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init { path: Option<String> },
    /// Print the resource tree
    Tree {
        /// Levels to expand below the root categories
        #[arg(long, default_value_t = 3)]
        depth: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print the resource tree again whenever it changes
    Watch {
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
    /// Scroll a node into view by its label path, e.g. `Pipelines build`
    Reveal {
        #[arg(required = true)]
        path: Vec<String>,
    },
    #[command(subcommand)]
    Pipeline(PipelineCommand),
    #[command(name = "pipelinerun", subcommand)]
    PipelineRun(PipelineRunCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(name = "taskrun", subcommand)]
    TaskRun(TaskRunCommand),
    #[command(name = "clustertask", subcommand)]
    ClusterTask(ClusterTaskCommand),
}

#[derive(Subcommand)]
enum PipelineCommand {
    Start { name: Option<String> },
    Describe { name: Option<String> },
    Delete { name: Option<String> },
}

#[derive(Subcommand)]
enum PipelineRunCommand {
    Describe { name: Option<String> },
    Logs { name: Option<String> },
    Cancel { name: Option<String> },
    Delete { name: Option<String> },
}

#[derive(Subcommand)]
enum TaskCommand {
    Describe { name: Option<String> },
    Delete { name: Option<String> },
}

#[derive(Subcommand)]
enum TaskRunCommand {
    Describe { name: Option<String> },
    Logs { name: Option<String> },
    Delete { name: Option<String> },
}

#[derive(Subcommand)]
enum ClusterTaskCommand {
    Describe { name: Option<String> },
}

impl Commands {
    /// The action and optional context resource name, for resource subcommands
    fn action(&self) -> Option<(Action, Option<&str>)> {
        let (action, name) = match self {
            Commands::Pipeline(cmd) => match cmd {
                PipelineCommand::Start { name } => (Action::StartPipeline, name),
                PipelineCommand::Describe { name } => (Action::DescribePipeline, name),
                PipelineCommand::Delete { name } => (Action::DeletePipeline, name),
            },
            Commands::PipelineRun(cmd) => match cmd {
                PipelineRunCommand::Describe { name } => (Action::DescribePipelineRun, name),
                PipelineRunCommand::Logs { name } => (Action::ShowPipelineRunLogs, name),
                PipelineRunCommand::Cancel { name } => (Action::CancelPipelineRun, name),
                PipelineRunCommand::Delete { name } => (Action::DeletePipelineRun, name),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommand::Describe { name } => (Action::DescribeTask, name),
                TaskCommand::Delete { name } => (Action::DeleteTask, name),
            },
            Commands::TaskRun(cmd) => match cmd {
                TaskRunCommand::Describe { name } => (Action::DescribeTaskRun, name),
                TaskRunCommand::Logs { name } => (Action::ShowTaskRunLogs, name),
                TaskRunCommand::Delete { name } => (Action::DeleteTaskRun, name),
            },
            Commands::ClusterTask(ClusterTaskCommand::Describe { name }) => {
                (Action::DescribeClusterTask, name)
            }
            _ => return None,
        };
        Some((action, name.as_deref()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        return init_config(path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
    }

    let config = ExplorerConfig::load_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration. Run `tekton-explorer init` to create {}",
            DEFAULT_CONFIG_PATH
        )
    })?;

    init_logging(&config.logging)?;
    info!("Starting Tekton Pipeline Explorer");

    let (terminal_tx, terminal_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(terminal::print_terminal(terminal_rx));

    let host: Arc<dyn Host> = Arc::new(TerminalHost::new());
    let ctx = AppContext::from_config(&config, host, terminal_tx);

    let result = run(&ctx, &cli.command).await;

    ctx.dispose();
    drop(ctx);

    // Streamed output still queued when the last sender went away
    if tokio::time::timeout(Duration::from_secs(1), printer)
        .await
        .is_err()
    {
        error!("Terminal output did not drain before shutdown");
    }

    result
}

async fn run(ctx: &AppContext, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Tree { depth, json } => {
            let tree = terminal::snapshot(&ctx.explorer, *depth).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{}", terminal::render(&tree));
            }
            Ok(())
        }
        Commands::Watch { depth } => watch_tree(ctx, *depth).await,
        Commands::Reveal { path } => {
            let node = ctx
                .explorer
                .resolve_path(path)
                .await
                .with_context(|| format!("No node at {}", path.join(" > ")))?;
            ctx.explorer.reveal(&node).await?;
            Ok(())
        }
        other => match other.action() {
            Some((action, name)) => run_action(ctx, action, name).await,
            None => Ok(()),
        },
    }
}

async fn run_action(ctx: &AppContext, action: Action, name: Option<&str>) -> anyhow::Result<()> {
    let context = match (name, action.spec().target_kind()) {
        (Some(name), Some(kind)) => Some(ResourceNode::named(kind, name, None)),
        _ => None,
    };

    match commands::invoke(ctx, action, context.as_ref()).await? {
        Some(Outcome::Terminal { handle, .. }) => {
            handle.wait().await;
            Ok(())
        }
        Some(Outcome::Captured { command, result }) => match result.error {
            Some(message) => anyhow::bail!("'{}' failed: {}", command, message),
            None => Ok(()),
        },
        None => {
            info!("{:?} cancelled", action);
            Ok(())
        }
    }
}

async fn watch_tree(ctx: &AppContext, depth: usize) -> anyhow::Result<()> {
    let mut changes = ctx.explorer.subscribe();

    loop {
        let tree = terminal::snapshot(&ctx.explorer, depth).await;
        println!("{}", terminal::render(&tree));

        tokio::select! {
            change = changes.recv() => match change {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    info!("Tree changed, re-rendering");
                }
                Err(RecvError::Closed) => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to set global logging subscriber: {}", e))
}

fn init_config(config_path: &str) -> anyhow::Result<()> {
    if std::path::Path::new(config_path).exists() {
        eprintln!("Configuration file '{}' already exists.", config_path);
        eprintln!("Remove it first if you want to create a new one.");
        anyhow::bail!("refusing to overwrite {}", config_path);
    }

    let config = ExplorerConfig::default();
    config.save(config_path)?;

    println!("Configuration file '{}' created successfully!", config_path);
    println!();
    println!("Default configuration:");
    println!("  • tkn and kubectl resolved from PATH");
    println!("  • Resource cache enabled");
    println!("  • Tree refreshes when the kubeconfig file changes");
    println!();
    println!("To browse the cluster:");
    println!("  tekton-explorer --config {} tree", config_path);

    Ok(())
}
