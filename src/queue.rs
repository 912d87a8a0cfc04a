use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::notify::Notifier;
use crate::sink::MessageSink;

/// Delay between channel sends, well under Telegram's ~30 msg/s ceiling.
pub const SEND_PACING: Duration = Duration::from_millis(50);

/// Producer handle for the channel delivery queue.
#[derive(Clone)]
pub struct QueueHandle {
    pub(crate) tx: mpsc::UnboundedSender<String>,
}

impl QueueHandle {
    pub fn push(&self, message: String) {
        if self.tx.send(message).is_err() {
            warn!("Delivery worker is gone; dropping message");
        }
    }
}

/// Spawn the delivery worker and return the producer handle.
///
/// A single consumer task drains the channel in FIFO order for the life of
/// the process, pacing sends to respect the transport's rate limit. A failed
/// send is reported and its message dropped; the worker moves on.
pub fn spawn(sink: Arc<dyn MessageSink>, notifier: Notifier, pacing: Duration) -> QueueHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        info!("Delivery worker started");
        while let Some(message) = rx.recv().await {
            if let Err(e) = sink.send(&message).await {
                error!("Failed to deliver channel message: {:#}", e);
                notifier
                    .notify(format!("Error sending message: {:#}", e))
                    .await;
            }
            tokio::time::sleep(pacing).await;
        }
        info!("Delivery worker stopped");
    });

    QueueHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::testing::RecordingSink;

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let sink = Arc::new(RecordingSink::default());
        let ops = Arc::new(RecordingSink::default());
        let queue = spawn(sink.clone(), Notifier::new(ops), Duration::from_millis(1));

        for i in 0..5 {
            queue.push(format!("message {}", i));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;

        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 5);
        for (i, message) in sent.iter().enumerate() {
            assert_eq!(message, &format!("message {}", i));
        }
    }

    #[tokio::test]
    async fn failed_send_is_dropped_and_reported() {
        let sink = Arc::new(RecordingSink::default());
        *sink.fail_first.lock().await = 1;
        let ops = Arc::new(RecordingSink::default());
        let queue = spawn(
            sink.clone(),
            Notifier::new(ops.clone()),
            Duration::from_millis(1),
        );

        queue.push("first".to_string());
        queue.push("second".to_string());

        tokio::time::sleep(Duration::from_millis(100)).await;

        // The failed message is gone, the next one still went out.
        let sent = sink.sent.lock().await;
        assert_eq!(*sent, vec!["second".to_string()]);

        let reports = ops.sent.lock().await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("Error sending message"));
    }

    #[tokio::test]
    async fn messages_enqueued_mid_drain_are_picked_up() {
        let sink = Arc::new(RecordingSink::default());
        let ops = Arc::new(RecordingSink::default());
        let queue = spawn(sink.clone(), Notifier::new(ops), Duration::from_millis(5));

        queue.push("early".to_string());
        tokio::time::sleep(Duration::from_millis(2)).await;
        queue.push("late".to_string());

        tokio::time::sleep(Duration::from_millis(100)).await;

        let sent = sink.sent.lock().await;
        assert_eq!(*sent, vec!["early".to_string(), "late".to_string()]);
    }
}
