use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use hooksmith::{
    AgentRegistry, Backend, ChannelSink, ChatProvider, Executor, HookTemplateAgent,
    HttpVideoDbConnector, LlmProvider, MessageSink, OutputMessage, ProjectConfig, RetryConfig,
    SessionEvent, SessionStatus, SqliteStorage, Storage,
};

#[derive(Parser)]
#[command(name = "hooksmith", version)]
#[command(about = "Generate video hook templates from transcripts and scenes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// LLM provider to use (anthropic, openai)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Path to a hooksmith.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session database path (defaults to ~/.hooksmith/sessions.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every registered agent's description as JSON
    Agents,

    /// Generate a hook template for a video
    Hook {
        /// ID of the video to analyze
        #[arg(long)]
        video_id: String,

        /// Collection ID of the video
        #[arg(long)]
        collection_id: String,

        /// Description of the desired hook style
        #[arg(long)]
        prompt: String,

        /// Do not save the session
        #[arg(long)]
        no_save: bool,
    },

    /// List saved sessions
    Sessions {
        /// Show only sessions with this status (pending, running, completed, failed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one saved session
    Show {
        /// Session ID
        session_id: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive("info".parse().expect("valid log directive"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve which provider name to use.
/// CLI argument takes highest precedence, then config file, then default.
fn resolve_provider<'a>(
    cli_provider: Option<&'a str>,
    config_provider: Option<&'a str>,
) -> &'a str {
    cli_provider.or(config_provider).unwrap_or("anthropic")
}

fn create_provider(
    provider: &str,
    model: Option<&str>,
    config: &ProjectConfig,
) -> Result<Arc<dyn LlmProvider>> {
    let p = match (provider, model) {
        ("anthropic", Some(m)) => ChatProvider::new(Backend::Anthropic, m)?,
        ("anthropic", None) => ChatProvider::sonnet()?,
        ("openai", Some(m)) => ChatProvider::new(Backend::OpenAI, m)?,
        ("openai", None) => ChatProvider::gpt4o()?,
        _ => anyhow::bail!("unknown provider: {}", provider),
    };
    Ok(Arc::new(
        p.with_retry(RetryConfig::from_settings(&config.retry)),
    ))
}

fn create_registry(cli: &Cli, config: &ProjectConfig) -> Result<AgentRegistry> {
    let provider_name = resolve_provider(cli.provider.as_deref(), config.provider.as_deref());
    let model_name = cli.model.as_deref().or(config.model.as_deref());

    let llm = create_provider(provider_name, model_name, config)
        .context("failed to create LLM provider")?;
    let videodb = HttpVideoDbConnector::from_settings(&config.videodb)
        .context("failed to create video database client")?;

    let mut registry = AgentRegistry::new();
    registry.register(
        HookTemplateAgent::new(llm, Arc::new(videodb)).with_limits(config.prompt),
    )?;
    Ok(registry)
}

fn open_storage(db: Option<&PathBuf>) -> Result<SqliteStorage> {
    match db {
        Some(path) => SqliteStorage::new(path),
        None => SqliteStorage::default_location(),
    }
    .context("failed to initialize session storage")
}

/// Print new actions and the final status as they arrive
async fn print_progress(mut rx: mpsc::Receiver<SessionEvent>) {
    let mut seen = 0;
    while let Some(event) = rx.recv().await {
        let snapshot = event.snapshot();
        for action in snapshot.actions.iter().skip(seen) {
            eprintln!("  {}", action);
        }
        seen = seen.max(snapshot.actions.len());

        if let SessionEvent::Published(s) = &event {
            for content in &s.content {
                eprintln!("  [{}] {}", content.status, content.status_message);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ProjectConfig::discover(cli.config.as_deref())?;
    debug!(?config, "resolved configuration");

    match &cli.command {
        Commands::Agents => {
            let registry = create_registry(&cli, &config)?;
            let descriptions = serde_json::to_string_pretty(&registry.to_llm_format())
                .context("failed to serialize agent descriptions")?;
            println!("{}", descriptions);
        }

        Commands::Hook {
            video_id,
            collection_id,
            prompt,
            no_save,
        } => {
            let registry = create_registry(&cli, &config)?;
            let args = json!({
                "video_id": video_id,
                "collection_id": collection_id,
                "prompt": prompt,
            });

            let (sink, rx) = ChannelSink::channel(64);
            let printer = tokio::spawn(print_progress(rx));
            let sink: Arc<dyn MessageSink> = Arc::new(sink);

            info!(video_id = %video_id, collection_id = %collection_id, "starting hook template");

            let response = if *no_save {
                let executor = Executor::new(registry);
                let mut output = OutputMessage::new(uuid::Uuid::new_v4().to_string(), sink);
                executor.invoke("hook_template", args, &mut output).await
            } else {
                let storage = open_storage(cli.db.as_ref())?;
                let executor = Executor::with_storage(registry, Box::new(storage));
                let session = executor
                    .invoke_with_session("hook_template", args, sink)
                    .await?;
                info!(session_id = %session.id, "session saved");
                session
                    .response
                    .context("session finished without a response")?
            };

            // All sink handles are gone once the executor returns
            let _ = printer.await;

            if !response.is_success() {
                error!(message = %response.message(), "hook template failed");
                anyhow::bail!("{}", response.message());
            }

            let template = response
                .data()
                .get("template")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            println!("\n{}", template);
        }

        Commands::Sessions { status } => {
            let storage = open_storage(cli.db.as_ref())?;
            let sessions = storage.list().await?;

            // Parse status filter if provided
            let status_filter = if let Some(s) = status {
                Some(
                    s.parse::<SessionStatus>()
                        .with_context(|| format!("invalid status filter: {}", s))?,
                )
            } else {
                None
            };

            if sessions.is_empty() {
                println!("No sessions found.");
                return Ok(());
            }

            println!(
                "{:<10} {:<16} {:<10} {:<26} ERROR",
                "ID", "AGENT", "STATUS", "UPDATED"
            );
            println!("{}", "-".repeat(80));

            for session in sessions {
                if let Some(filter_status) = status_filter {
                    if session.status != filter_status {
                        continue;
                    }
                }

                println!("{}", session);
            }
        }

        Commands::Show { session_id } => {
            let storage = open_storage(cli.db.as_ref())?;
            let session = storage
                .load(session_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("session not found: {}", session_id))?;

            println!("Session:   {}", session.id);
            println!("Agent:     {}", session.agent);
            println!("Status:    {}", session.status);
            println!("Arguments: {}", session.arguments);
            if let Some(e) = &session.error {
                println!("Error:     {}", e);
            }
            if let Some(template) = session.template() {
                println!("\n{}", template);
            }
        }
    }

    Ok(())
}
