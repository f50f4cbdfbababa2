use crate::config::Settings;
use crate::detect;
use crate::fetch::PageFetcher;
use crate::notify::{EmailMessage, Notifier};
use crate::storage::{FileStateStore, WatchState};
use crate::time::report_window::{self, CivilMoment};
use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Everything a run needs to know about the watched page and who to
/// tell, gathered once at startup so missing configuration fails before
/// any side effect.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    pub page_url: String,
    pub primary_recipient: String,

    /// Extra urgent channel (an SMS gateway address, typically); only
    /// the restock alert goes here.
    pub secondary_recipient: Option<String>,
    pub timezone: Tz,
}

impl WatchTarget {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            page_url: settings.require_page_url()?.to_string(),
            primary_recipient: settings.require_primary_recipient()?.to_string(),
            secondary_recipient: settings.secondary_recipient.clone(),
            timezone: settings.report_timezone()?,
        })
    }
}

/// Which notifications this run should attempt. Both triggers are
/// evaluated independently and may fire in the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub restock_alert: bool,
    pub daily_report: bool,
}

/// The restock alert is edge-triggered: it fires only on the
/// out-of-stock to in-stock transition, never on a steady in-stock
/// poll. The daily report fires at most once per civil date, gated on
/// the persisted watermark and the morning window.
pub fn decide(verdict: bool, prior: &WatchState, moment: &CivilMoment) -> Decision {
    Decision {
        restock_alert: verdict && !prior.last_in_stock,
        daily_report: report_window::in_report_window(moment)
            && prior.last_daily_report_date != moment.date_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub verdict: bool,
    pub restock_alert_sent: bool,
    pub daily_report_sent: bool,
    pub notification_failures: u32,
}

/// One complete check: fetch, classify, decide, notify, persist.
///
/// A failed notification is logged and counted but never unwinds the
/// run; state still advances so the next run does not re-detect the
/// same stale transition. The lost alert is not retried. With
/// `dry_run`, the page is fetched and decisions are logged but nothing
/// is sent or written.
pub async fn run_once(
    target: &WatchTarget,
    fetcher: &dyn PageFetcher,
    notifier: &dyn Notifier,
    store: &FileStateStore,
    now_utc: DateTime<Utc>,
    dry_run: bool,
) -> anyhow::Result<RunReport> {
    let content = fetcher
        .fetch_page(&target.page_url)
        .await
        .context("page fetch failed")?;

    let verdict = detect::appears_purchasable(&content);
    let fingerprint = detect::fingerprint(&content);
    let moment = report_window::civil_moment(now_utc, target.timezone);

    let mut state = store.load();
    let decision = decide(verdict, &state, &moment);

    tracing::info!(
        verdict,
        %fingerprint,
        date = %moment.date,
        hour = moment.hour,
        minute = moment.minute,
        restock_alert = decision.restock_alert,
        daily_report = decision.daily_report,
        "stock check evaluated"
    );

    let mut report = RunReport {
        verdict,
        ..Default::default()
    };

    if dry_run {
        tracing::info!(dry_run = true, "skipping notifications and state write");
        return Ok(report);
    }

    if decision.restock_alert {
        match notifier.send(&restock_message(target, &fingerprint)).await {
            Ok(()) => report.restock_alert_sent = true,
            Err(err) => {
                report.notification_failures += 1;
                tracing::error!(error = %format!("{err:#}"), "restock alert delivery failed");
            }
        }
    }

    if decision.daily_report {
        match notifier
            .send(&daily_report_message(target, verdict, &fingerprint))
            .await
        {
            Ok(()) => {
                report.daily_report_sent = true;
                // Advance the watermark only on a delivered report, so a
                // failed one is retried by the next run in the window.
                state.last_daily_report_date = moment.date_string();
            }
            Err(err) => {
                report.notification_failures += 1;
                tracing::error!(error = %format!("{err:#}"), "daily report delivery failed");
            }
        }
    }

    state.last_in_stock = verdict;
    state.last_fingerprint = fingerprint;

    store.save(&state).context("persist watch state failed")?;

    Ok(report)
}

fn restock_message(target: &WatchTarget, fingerprint: &str) -> EmailMessage {
    let mut to = vec![target.primary_recipient.clone()];
    if let Some(secondary) = &target.secondary_recipient {
        to.push(secondary.clone());
    }

    EmailMessage {
        to,
        subject: "Back in stock".to_string(),
        body: format!(
            "The watched item appears to be back in stock.\n\n{}\n\npage fingerprint: {fingerprint}",
            target.page_url
        ),
    }
}

fn daily_report_message(target: &WatchTarget, verdict: bool, fingerprint: &str) -> EmailMessage {
    let status = if verdict { "IN STOCK" } else { "OUT OF STOCK" };

    EmailMessage {
        to: vec![target.primary_recipient.clone()],
        subject: format!("Daily stock check: {status}"),
        body: format!(
            "Current status: {status}\n\n{}\n\npage fingerprint: {fingerprint}",
            target.page_url
        ),
    }
}
