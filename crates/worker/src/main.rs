//! Single-run stock checker, meant to be invoked by an external
//! scheduler (cron or similar) once per tick.
//!
//! Operational precondition: invocations must not overlap. The state
//! file has no lock, so two simultaneous runs can race on its
//! read-modify-write and double-send the restock alert or lose the
//! daily-report watermark. Keep the scheduling interval above the
//! expected run duration.

use anyhow::Context;
use clap::Parser;
use shelfwatch_core::engine::{self, WatchTarget};
use shelfwatch_core::fetch::HttpPageFetcher;
use shelfwatch_core::notify::resend::ResendClient;
use shelfwatch_core::storage::{DEFAULT_STATE_PATH, FileStateStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "shelfwatch_worker")]
struct Args {
    /// Fetch and classify the page and log the decisions, but send no
    /// email and write no state.
    #[arg(long)]
    dry_run: bool,

    /// Where the watch state lives. Defaults to WATCH_STATE_PATH, then
    /// ./watch_state.json.
    #[arg(long)]
    state_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = shelfwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let target = WatchTarget::from_settings(&settings)?;

    let state_path = args
        .state_path
        .or_else(|| settings.state_path.clone())
        .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string());
    let store = FileStateStore::new(state_path);

    let fetcher = HttpPageFetcher::from_env()?;
    let notifier = ResendClient::from_settings(&settings).context("email client setup failed")?;

    let now_utc = chrono::Utc::now();
    let result = engine::run_once(
        &target,
        &fetcher,
        &notifier,
        &store,
        now_utc,
        args.dry_run,
    )
    .await;

    match result {
        Ok(report) => {
            tracing::info!(
                verdict = report.verdict,
                restock_alert_sent = report.restock_alert_sent,
                daily_report_sent = report.daily_report_sent,
                notification_failures = report.notification_failures,
                dry_run = args.dry_run,
                "stock check run complete"
            );
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "stock check run failed");
            Err(err)
        }
    }
}

fn init_sentry(settings: &shelfwatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
