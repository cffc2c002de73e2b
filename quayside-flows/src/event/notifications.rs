//! Notification count refresh.
//!
//! Sale decisions and review submissions change how many sales still wait
//! on the provider. This subscriber re-queries that count after either and
//! publishes it as [`FlowEvent::NotificationCountChanged`], so badge
//! surfaces stay current without the workflows knowing about them.

use std::sync::Arc;

use async_trait::async_trait;
use quayside_api::Transition;
use quayside_client::{QueryTransactionsParams, TransactionSide, TransactionsApi};
use tracing::warn;

use super::{EventBus, EventSubscriber, FlowEvent};
use crate::config::FlowConfig;

/// Refreshes the count of sales requiring attention after workflow events.
pub struct NotificationRefresher {
    api: Arc<dyn TransactionsApi>,
    events: Arc<EventBus>,
    page_size: u32,
}

impl NotificationRefresher {
    /// Create a refresher that publishes counts back to the given bus.
    ///
    /// Only the page meta's total is read from the count query, so the
    /// configured notification page size stays small.
    pub fn new(api: Arc<dyn TransactionsApi>, events: Arc<EventBus>, config: &FlowConfig) -> Self {
        Self {
            api,
            events,
            page_size: config.notification_page_size,
        }
    }

    async fn refresh(&self) {
        let params = QueryTransactionsParams::only(TransactionSide::Sale)
            .with_last_transitions(Transition::requiring_attention())
            .with_page(1)
            .with_per_page(self.page_size);
        match self.api.query_transactions(params).await {
            Ok(response) => {
                let count = response.meta.map(|meta| meta.total_items).unwrap_or(0);
                self.events.publish_notification_count_changed(count).await;
            }
            Err(error) => {
                // The triggering operation already succeeded; never surface
                // a refresh failure past this point.
                warn!(error = %error, "notification count refresh failed");
            }
        }
    }
}

#[async_trait]
impl EventSubscriber for NotificationRefresher {
    async fn handle_event(&self, event: FlowEvent) {
        match event {
            FlowEvent::SaleTransitioned { .. } | FlowEvent::ReviewSubmitted { .. } => {
                self.refresh().await;
            }
            _ => {}
        }
    }
}
