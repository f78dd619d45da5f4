use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Error;
use crate::mailer::{Mailer, SmtpMailer};
use crate::notifier::Notifier;
use crate::prober::{HttpProber, Prober};
use crate::tracker::{StateTracker, Status, Transition};

/// What a single pass over the targets did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub transitions: Vec<(String, Transition)>,
    pub failed_notifications: usize,
}

/// Polls every target in order, then sleeps, forever.
pub struct Monitor<P, M> {
    prober: P,
    notifier: Notifier<M>,
    tracker: StateTracker,
    targets: Vec<String>,
    interval: Duration,
}

impl Monitor<HttpProber, SmtpMailer> {
    /// # Errors
    ///
    /// Fails if the HTTP client or the SMTP transport cannot be set up.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let prober = HttpProber::new(config.check.timeout(), config.check.require_success_status)?;
        let notifier = Notifier::new(SmtpMailer::new(&config.email)?, config.recipients.clone());
        Ok(Self::new(
            prober,
            notifier,
            config.check.urls.clone(),
            config.check.interval(),
        ))
    }
}

impl<P: Prober, M: Mailer> Monitor<P, M> {
    /// Repeated targets are kept once, at their first position.
    pub fn new(prober: P, notifier: Notifier<M>, targets: Vec<String>, interval: Duration) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(targets.len());
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        let targets = unique;

        Self {
            prober,
            notifier,
            tracker: StateTracker::new(targets.iter().cloned()),
            targets,
            interval,
        }
    }

    #[must_use]
    pub fn status(&self, url: &str) -> Option<Status> {
        self.tracker.status(url)
    }

    /// Checks every target once, in configuration order.
    ///
    /// A failed notification is logged and counted but the new status is kept,
    /// so the alert is not repeated on the next pass.
    pub async fn run_pass(&mut self) -> PassSummary {
        info!("Checking website status...");
        let mut summary = PassSummary::default();

        for url in &self.targets {
            let is_up = self.prober.is_url_up(url).await;
            summary.checked += 1;

            let Some(transition) = self.tracker.observe(url, is_up) else {
                continue;
            };
            match transition {
                Transition::WentDown => error!("DOWN: {url}"),
                Transition::WentUp => info!("UP: {url}"),
            }

            if let Err(e) = self.notifier.notify(url, transition).await {
                error!("Failed to send emails for {url}: {e}");
                summary.failed_notifications += 1;
            }
            summary.transitions.push((url.clone(), transition));
        }

        summary
    }

    /// Runs passes until `token` is cancelled.
    ///
    /// Cancellation drops whatever is in flight, a probe, a send or the sleep,
    /// and returns right away.
    pub async fn run(mut self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                info!("Shutdown requested, stopping monitor");
                break;
            }

            let summary = select! {
                summary = self.run_pass() => summary,
                () = token.cancelled() => {
                    info!("Shutdown requested during check");
                    break;
                }
            };
            debug!(
                "Pass done: {} checked, {} transitions, {} failed notifications",
                summary.checked,
                summary.transitions.len(),
                summary.failed_notifications
            );

            info!("Checking again in {} seconds", self.interval.as_secs());
            select! {
                () = sleep(self.interval) => {},
                () = token.cancelled() => {
                    info!("Shutdown requested during sleep");
                    break;
                }
            }
        }

        info!("Website monitoring stopped");
    }
}

/// Logs the effective configuration and monitors the configured websites
/// until `token` is cancelled.
///
/// # Errors
///
/// Fails only during setup, see [`Monitor::from_config`].
pub async fn monitor_websites(config: &Config, token: CancellationToken) -> Result<(), Error> {
    info!("Starting website monitoring...");
    info!("Check interval: {} seconds", config.check.interval_secs);
    match config.check.timeout_secs {
        Some(secs) => info!("Timeout: {secs} seconds"),
        None => warn!("Timeout is not set, a hanging site delays the whole pass"),
    }
    if config.check.require_success_status {
        info!("Non-2xx responses are reported as DOWN");
    }
    info!("Monitoring {} websites", config.check.urls.len());
    info!(
        "Notifying {} recipients through {}:{}",
        config.recipients.len(),
        config.email.smtp_domain,
        config.email.port
    );

    Monitor::from_config(config)?.run(token).await;
    Ok(())
}
