use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::alerts::AlertFilter;
use crate::feed::FeedClient;
use crate::format::format_load;
use crate::notify::Notifier;
use crate::queue::QueueHandle;
use crate::sink::MessageSink;
use crate::state::{SeenLoads, SeenStore};

/// Wall-clock gap between fetch cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Drives the fetch → dedup → relay pipeline.
pub struct Poller {
    feed: FeedClient,
    store: SeenStore,
    queue: QueueHandle,
    alerts: AlertFilter,
    admin: Arc<dyn MessageSink>,
    notifier: Notifier,
}

impl Poller {
    pub fn new(
        feed: FeedClient,
        store: SeenStore,
        queue: QueueHandle,
        alerts: AlertFilter,
        admin: Arc<dyn MessageSink>,
        notifier: Notifier,
    ) -> Self {
        Self {
            feed,
            store,
            queue,
            alerts,
            admin,
            notifier,
        }
    }

    /// Run fetch cycles forever. Cycles are serialized: a cycle that outlives
    /// the interval skips ticks instead of overlapping the next one, so the
    /// state file never sees competing writers.
    pub async fn run(self) {
        let mut ticker = interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One fetch cycle. Every failure is reported to the admin and affects
    /// this cycle only; the next tick starts clean.
    pub async fn run_cycle(&self) {
        let mut seen = match self.store.load() {
            Ok(seen) => seen,
            Err(e) => {
                error!("Failed to load seen-load state: {:#}", e);
                self.notifier
                    .notify(format!("Error loading state: {:#}", e))
                    .await;
                SeenLoads::default()
            }
        };

        let loads = match self.feed.fetch().await {
            Ok(loads) => loads,
            Err(e) => {
                error!("Fetch cycle failed: {:#}", e);
                self.notifier
                    .notify(format!("Error fetching loads: {:#}", e))
                    .await;
                return;
            }
        };

        if loads.is_empty() {
            debug!("Nothing to relay ({} ids seen)", seen.len());
            return;
        }

        let mut fresh = 0usize;
        for load in &loads {
            if !seen.is_new(&load.load_id) {
                continue;
            }
            // Mark before any send so a repeated id later in the same batch
            // cannot relay twice.
            seen.mark(&load.load_id);
            fresh += 1;

            let message = format_load(load);
            self.queue.push(message.clone());

            let hits = self.alerts.matches(&load.origin_location_state).await;
            for _ in 0..hits {
                if let Err(e) = self.admin.send(&message).await {
                    error!("Failed to send admin alert: {:#}", e);
                    self.notifier
                        .notify(format!("Error sending alert: {:#}", e))
                        .await;
                }
            }
        }

        if fresh > 0 {
            info!("Relayed {} new listing(s) of {}", fresh, loads.len());
        } else {
            debug!("No new listings among {}", loads.len());
        }

        if let Err(e) = self.store.save(&seen) {
            error!("Failed to save seen-load state: {:#}", e);
            self.notifier
                .notify(format!("Error saving state: {:#}", e))
                .await;
        }
    }
}
