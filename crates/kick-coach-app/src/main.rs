//! kick-coach command-line shell: runs one analysis attempt for a video file
//! and prints the resulting view.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kick_coach_app::{
    AppConfig, Notification, WorkflowController, app_version, load_candidate, parse_timeout,
    project_view,
};
use kick_coach_core::{Foot, SessionDefaults, UploadStatus};
use kick_coach_upload::FormLayout;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kick-coach", version = app_version(), about = "Analyze a kick video")]
struct Cli {
    /// Video file to analyze.
    video: PathBuf,

    /// Kicking foot.
    #[arg(long, default_value = "right")]
    foot: Foot,

    /// Analysis endpoint (overrides KICK_COACH_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides KICK_COACH_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<String>,

    /// Send `file` / `rightFoot` fields instead of `video` / `foot`.
    #[arg(long)]
    legacy_form: bool,

    /// Declared media type; sniffed from the file when omitted.
    #[arg(long)]
    media_type: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(raw) = cli.timeout_secs.as_deref() {
        config.timeout = parse_timeout(raw)?;
    }
    if cli.legacy_form {
        config.form_layout = FormLayout::Legacy;
    }

    info!(
        stage = "startup",
        action = "config",
        version = app_version(),
        endpoint = %config.endpoint,
        timeout_secs = config.timeout.as_secs(),
        layout = ?config.form_layout,
        "kick-coach starting"
    );

    let client = config.build_client()?;
    let mut controller =
        WorkflowController::new(client, SessionDefaults::seed(), config.form_layout);
    controller.select_foot(cli.foot);

    let candidate = load_candidate(&cli.video, cli.media_type.as_deref())
        .await
        .with_context(|| format!("reading {}", cli.video.display()))?;
    let status = controller.select_file(candidate).await?;

    for notification in controller.drain_notifications() {
        match notification {
            Notification::AnalysisSucceeded { file_name } => {
                eprintln!("Analysis ready for {file_name}");
            }
        }
    }

    let view = project_view(&controller);
    println!("{}", serde_json::to_string_pretty(&view)?);

    if status == UploadStatus::Failed {
        bail!(
            "{}",
            view.error_message.unwrap_or_else(|| "analysis failed".to_string())
        );
    }
    Ok(())
}
