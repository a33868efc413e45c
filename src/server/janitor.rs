//! Stale diagnostic janitor.
//!
//! After a bulk delete/rename the host no longer tracks the removed files, so
//! nobody clears their diagnostics. The janitor publishes an empty set for
//! each of them once the settle delay has elapsed. A rebuild finishing after
//! that point can still race the erase; this is accepted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::client::{Client, PublishDiagnostics};
use crate::config::{ErasePolicy, SessionOptions};
use crate::core::Cell;
use crate::model::Model;

#[derive(Clone)]
pub struct StaleDiagnosticJanitor {
    client: Arc<dyn Client>,
    model: Arc<Cell<Model>>,
    settle_delay: Duration,
    policy: ErasePolicy,
}

impl StaleDiagnosticJanitor {
    pub fn new(client: Arc<dyn Client>, model: Arc<Cell<Model>>, options: &SessionOptions) -> Self {
        Self {
            client,
            model,
            settle_delay: options.settle_delay,
            policy: options.erase_policy,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Erase diagnostics of `uris` after the settle delay.
    ///
    /// Without a tokio runtime the erase happens immediately and `None` is
    /// returned.
    pub fn schedule_erase(&self, uris: Vec<String>) -> Option<JoinHandle<()>> {
        if uris.is_empty() {
            return None;
        }
        tracing::debug!(
            count = uris.len(),
            delay_ms = self.settle_delay.as_millis() as u64,
            "scheduling diagnostic erase"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let janitor = self.clone();
                Some(runtime.spawn(async move {
                    tokio::time::sleep(janitor.settle_delay).await;
                    janitor.erase(&uris);
                }))
            }
            Err(_) => {
                tracing::warn!("no async runtime; erasing stale diagnostics without delay");
                self.erase(&uris);
                None
            }
        }
    }

    fn erase(&self, uris: &[String]) {
        let live = match self.policy {
            ErasePolicy::AfterSettleDelay => None,
            ErasePolicy::SkipLiveDocuments => self.model.current(),
        };

        for uri in uris {
            if live.as_ref().is_some_and(|model| model.contains(uri)) {
                tracing::debug!(uri = %uri, "document is live again; keeping its diagnostics");
                continue;
            }
            self.client.publish_diagnostics(PublishDiagnostics::empty(uri.clone()));
        }
    }
}
