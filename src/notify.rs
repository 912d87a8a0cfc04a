use std::sync::Arc;

use tracing::error;

use crate::sink::MessageSink;

/// Operational reporting to the admin chat: the startup announcement and
/// every caught error from every component go through here.
///
/// Fire-and-forget — a failed notify is logged and dropped, never reported
/// through itself.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn MessageSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    pub async fn notify(&self, text: impl Into<String>) {
        let text = text.into();
        if let Err(e) = self.sink.send(&text).await {
            error!("Failed to notify admin: {:#}", e);
        }
    }
}
