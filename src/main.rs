use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wssi_watch::data::duration::format_duration;
use wssi_watch::{Dashboard, Settings};

#[derive(Parser, Debug)]
#[command(name = "wssi-watch")]
#[command(about = "Poll the WSSI polycrisis dashboard API with static and bundled fallbacks")]
struct Args {
    /// Config file (TOML, YAML or JSON); WSSI_* environment variables also apply
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (e.g. "http://localhost:8000")
    #[arg(long)]
    api_base: Option<String>,

    /// Host the dashboard is served from; static hosts default to the production API
    #[arg(long)]
    page_host: Option<String>,

    /// Base URL serving /analytics/*.json (default: the API base)
    #[arg(long)]
    artifact_base: Option<String>,

    /// Directory with bundled sample payloads
    #[arg(long)]
    bundle_dir: Option<PathBuf>,

    /// API key sent as X-API-Key
    #[arg(long)]
    api_key: Option<String>,

    /// Access tier (free, basic, pro, enterprise or a legacy name)
    #[arg(long)]
    tier: Option<String>,

    /// Per-request timeout (e.g. "10s", "500ms")
    #[arg(long)]
    timeout: Option<String>,

    /// History window in days
    #[arg(long)]
    history_days: Option<u32>,

    /// Refresh interval for everything except alerts (e.g. "5m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Refresh interval for alerts (e.g. "30s")
    #[arg(long)]
    alert_refresh: Option<String>,

    /// |r| cutoff for strong correlations
    #[arg(long)]
    strong_threshold: Option<f64>,

    /// Refresh once, write the full state to a JSON file and exit
    #[arg(short, long, conflicts_with_all = ["once", "check"])]
    export: Option<PathBuf>,

    /// Refresh once, print the summary and exit
    #[arg(long, conflicts_with = "check")]
    once: bool,

    /// Probe the API health route and exit
    #[arg(long)]
    check: bool,
}

impl Args {
    /// Command-line flags win over file and environment settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_base {
            settings.api_base = Some(v.clone());
        }
        if let Some(v) = &self.page_host {
            settings.page_host = Some(v.clone());
        }
        if let Some(v) = &self.artifact_base {
            settings.artifact_base = Some(v.clone());
        }
        if let Some(v) = &self.bundle_dir {
            settings.bundle_dir = v.clone();
        }
        if let Some(v) = &self.api_key {
            settings.api_key = Some(v.clone());
        }
        if let Some(v) = &self.tier {
            settings.tier = v.clone();
        }
        if let Some(v) = &self.timeout {
            settings.timeout = v.clone();
        }
        if let Some(v) = self.history_days {
            settings.history_days = v;
        }
        if let Some(v) = &self.refresh {
            settings.refresh = v.clone();
        }
        if let Some(v) = &self.alert_refresh {
            settings.alert_refresh = v.clone();
        }
        if let Some(v) = self.strong_threshold {
            settings.strong_threshold = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wssi_watch=info,wssi_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let client = settings.build_client()?;
    debug!(
        api_base = client.api_base(),
        bundle_dir = %client.bundle_dir().display(),
        tier = %client.tier(),
        "Client ready"
    );

    if args.check {
        return check(&client).await;
    }

    let mut dashboard = Dashboard::new(client, settings.history_days, settings.thresholds.clone());

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        dashboard.refresh_all().await;
        dashboard
            .write_export(&export_path)
            .with_context(|| format!("Failed to write {}", export_path.display()))?;
        println!("Exported dashboard state to: {}", export_path.display());
        return Ok(());
    }

    if args.once {
        dashboard.refresh_all().await;
        if !dashboard.has_data() {
            bail!("No resource could be loaded from any source");
        }
        print!("{}", dashboard.summary());
        return Ok(());
    }

    watch(
        dashboard,
        settings.refresh_interval()?,
        settings.alert_interval()?,
    )
    .await
}

async fn check(client: &wssi_client::DashboardApiClient) -> Result<()> {
    let report = client.health().await.context("Health check failed")?;
    println!(
        "{} {} (HTTP {}, {})",
        report.url,
        report.status,
        report.http_status,
        format_duration(report.latency)
    );
    if !report.is_healthy() {
        bail!("API reported status '{}'", report.status);
    }
    Ok(())
}

/// Refresh on two cadences until Ctrl-C.
async fn watch(mut dashboard: Dashboard, refresh: Duration, alert_refresh: Duration) -> Result<()> {
    info!(
        "Watching: refresh every {}, alerts every {}",
        format_duration(refresh),
        format_duration(alert_refresh)
    );

    let mut core_timer = tokio::time::interval(refresh);
    let mut alert_timer = tokio::time::interval(alert_refresh);
    core_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    alert_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = core_timer.tick() => {
                let transitions = dashboard.refresh_core().await;
                debug!(transitions = transitions.len(), "Core refresh complete");
                print!("{}", dashboard.summary());
            }
            _ = alert_timer.tick() => {
                dashboard.refresh_alerts().await;
                if let Some(alerts) = &dashboard.alerts {
                    debug!(
                        active = alerts.data.active().count(),
                        source = %alerts.label,
                        "Alerts refreshed"
                    );
                }
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}
