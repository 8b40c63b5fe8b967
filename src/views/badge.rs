use crate::client::{MessageQueries, Poller};
use std::time::Duration;

/// Unread message counter for the navigation bar.
#[derive(Debug)]
pub struct NotificationBadge {
    queries: MessageQueries,
    poller: Option<Poller>,
}

impl NotificationBadge {
    #[must_use]
    pub const fn new(queries: MessageQueries) -> Self {
        Self { queries, poller: None }
    }

    /// Starts refreshing the count every `interval`, beginning immediately.
    pub fn mount(&mut self, interval: Duration) {
        if self.poller.is_some() {
            return;
        }

        let queries = self.queries.clone();
        self.poller = Some(Poller::start("unread_badge", interval, move || {
            let queries = queries.clone();
            async move {
                if let Err(e) = queries.refetch_unread_count().await {
                    tracing::warn!(error = %e, "Failed to refresh unread count");
                }
            }
        }));
    }

    /// Stops polling without waiting on a refetch already in flight.
    pub fn unmount(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.poller.is_some()
    }

    /// Last fetched count, zero before the first fetch.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.queries.cached_unread_count().unwrap_or(0)
    }

    /// Badge text, `None` when there is nothing unread.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self.count() {
            0 => None,
            n => Some(n.to_string()),
        }
    }
}
