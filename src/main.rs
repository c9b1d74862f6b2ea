#![forbid(unsafe_code)]

//! `comms-governor`: AI communication governance service binary.
//!
//! `serve` loads configuration, opens the template store, starts the
//! settings watcher, retention purge, directive pump and HTTP API.
//! `validate` checks a response settings document and prints it
//! normalized.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tenant_comms_governor::audit::{AuditLogger, JsonlAuditWriter};
use tenant_comms_governor::config::GlobalConfig;
use tenant_comms_governor::dispatch::{EscalationSink, LogSink, WebhookSink};
use tenant_comms_governor::http::{self, AppState};
use tenant_comms_governor::orchestrator::GovernanceService;
use tenant_comms_governor::persistence::template_repo::TemplateRepo;
use tenant_comms_governor::persistence::{db, retention};
use tenant_comms_governor::policy::loader::SettingsLoader;
use tenant_comms_governor::policy::watcher::SettingsWatcher;
use tenant_comms_governor::scheduler::directives::{spawn_directive_pump, Directive, DirectiveRegistry};
use tenant_comms_governor::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "comms-governor", about = "AI communication governance service", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve,
    /// Validate a response settings JSON document.
    Validate {
        /// Settings file to check.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    match args.command {
        Command::Validate { ref path } => validate(path),
        Command::Serve => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
            .block_on(serve(args.config)),
    }
}

fn validate(path: &std::path::Path) -> Result<()> {
    let settings = SettingsLoader::load_file(path)?;
    let rendered = serde_json::to_string_pretty(&settings)?;
    println!("{rendered}");
    info!(path = %path.display(), "settings valid");
    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = match config_path {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => {
            info!("no --config given, using defaults");
            GlobalConfig::default()
        }
    };
    let config = Arc::new(config);
    info!(feature = %config.feature, "configuration loaded");

    // ── Initialize database ─────────────────────────────
    let pool = Arc::new(db::connect(&config.db_path).await?);
    let templates = TemplateRepo::new(pool);
    info!(db_path = %config.db_path.display(), "database connected");

    // ── Settings watcher ────────────────────────────────
    let watcher = Arc::new(SettingsWatcher::new(config.settings_dir.clone()));
    watcher.register(&config.feature).await?;
    watcher.start().await?;

    // ── Collaborators ───────────────────────────────────
    let sink: Arc<dyn EscalationSink> = match &config.escalation.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url.clone(), config.escalation.timeout())?),
        None => {
            info!("no escalation webhook configured, notices are logged only");
            Arc::new(LogSink)
        }
    };
    let directives = Arc::new(DirectiveRegistry::new());

    let mut service = GovernanceService::new(
        &config,
        Arc::clone(&watcher),
        templates.clone(),
        Arc::clone(&directives),
        sink,
    );
    if let Some(dir) = &config.audit_dir {
        let audit: Arc<dyn AuditLogger> = Arc::new(JsonlAuditWriter::new(dir.clone())?);
        service = service.with_audit(audit);
    }
    let tone_style = service.tone_style().await?;
    info!(tone = tone_style.tone.as_str(), style = tone_style.style.as_str(), "tone/style loaded");
    let service = Arc::new(service);

    // ── Background tasks ────────────────────────────────
    let ct = CancellationToken::new();
    let retention_handle = retention::spawn_retention_task(
        Arc::new(templates),
        config.retention_days,
        ct.clone(),
    );

    let (directive_tx, directive_rx) = mpsc::channel(64);
    let pump_handle = spawn_directive_pump(
        Arc::clone(&directives),
        config.directive_tick(),
        directive_tx,
        ct.clone(),
    );
    let consumer_handle = tokio::spawn(consume_directives(Arc::clone(&service), directive_rx));

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        service,
    });
    let http_ct = ct.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(state, http_ct).await {
            error!(%err, "http api failed");
        }
    });

    info!(port = config.http_port, "comms-governor ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();
    watcher.stop().await;

    let _ = tokio::join!(http_handle, retention_handle, pump_handle, consumer_handle);
    info!("comms-governor shut down");
    Ok(())
}

/// Release due replies. Delivery itself belongs to the messaging side;
/// here the template is re-checked and the reply is announced.
async fn consume_directives(service: Arc<GovernanceService>, mut rx: mpsc::Receiver<Directive>) {
    while let Some(directive) = rx.recv().await {
        match service.directive_fired(&directive).await {
            Ok(Some(template)) => info!(
                conversation_id = %directive.conversation_id,
                directive_id = %directive.id,
                template_id = %template.id,
                "automated reply due"
            ),
            Ok(None) => warn!(
                conversation_id = %directive.conversation_id,
                directive_id = %directive.id,
                "directive fired without a dispatchable template"
            ),
            Err(err) => error!(%err, directive_id = %directive.id, "failed to resolve directive"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
