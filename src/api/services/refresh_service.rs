use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::modules::effects::sinks::ChatDisplay;
use crate::modules::memory::store::ConversationLog;

/// Periodically re-reads the conversation log and pushes changed content to
/// a [`ChatDisplay`]. Shares nothing with the pipeline except the file.
pub struct LogRefresher {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LogRefresher {
    /// Must be called within a tokio runtime. The first read happens
    /// immediately.
    pub fn spawn(log: ConversationLog, display: Arc<dyn ChatDisplay>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_shown: Option<String> = None;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        let content = log.read_all();
                        if last_shown.as_deref() != Some(content.as_str()) {
                            display.show(&content);
                            last_shown = Some(content);
                        }
                    }
                }
            }
            debug!(path = %log.path().display(), "log refresher stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for LogRefresher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
