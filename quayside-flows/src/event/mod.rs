//! Event handling for Quayside workflows
//!
//! Completed workflow operations are published as [`FlowEvent`]s. Side
//! effects that no single operation owns, such as refreshing the sale
//! notification count, attach as [`EventSubscriber`]s; observers can also
//! follow the broadcast channel without registering a subscriber.

mod notifications;

pub use notifications::NotificationRefresher;

use std::sync::Arc;

use async_trait::async_trait;
use quayside_api::{ResourceRef, Transition};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Event types published by the workflow controllers
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// A transaction and its related entities were fetched
    TransactionFetched {
        /// Reference to the fetched transaction
        transaction: ResourceRef,
    },
    /// A sale decision transition was applied to a transaction
    SaleTransitioned {
        /// Reference to the transitioned transaction
        transaction: ResourceRef,
        /// The applied transition
        transition: Transition,
    },
    /// A message was delivered to a transaction's thread
    MessageSent {
        /// Reference to the transaction
        transaction: ResourceRef,
        /// Id of the new message
        message_id: Uuid,
    },
    /// A review transition completed
    ReviewSubmitted {
        /// Reference to the reviewed transaction
        transaction: ResourceRef,
        /// The review transition that was applied
        transition: Transition,
    },
    /// The current user's payout account field was saved
    PayoutAccountSaved {
        /// Id of the updated current user
        user_id: Uuid,
    },
    /// The number of sales requiring the provider's attention changed
    NotificationCountChanged {
        /// Current count of sales requiring attention
        count: u64,
    },
}

/// Event subscriber trait for receiving workflow events
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Handle a workflow event
    async fn handle_event(&self, event: FlowEvent);
}

/// Event bus for publishing and subscribing to workflow events
pub struct EventBus {
    /// Sender for events
    sender: broadcast::Sender<FlowEvent>,
    /// Subscribers
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        // Create a channel with capacity for 100 events
        let (sender, _) = broadcast::channel(100);

        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to workflow events
    pub async fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.push(subscriber);
    }

    /// Get a receiver for workflow events
    pub fn subscribe_channel(&self) -> broadcast::Receiver<FlowEvent> {
        self.sender.subscribe()
    }

    /// Remove a subscriber from the event bus
    pub async fn unsubscribe(&self, subscriber: &Arc<dyn EventSubscriber>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|s| !Arc::ptr_eq(s, subscriber));
    }

    /// Publish a transaction fetched event
    pub async fn publish_transaction_fetched(&self, transaction: ResourceRef) {
        self.publish_event(FlowEvent::TransactionFetched { transaction })
            .await;
    }

    /// Publish a sale transitioned event
    pub async fn publish_sale_transitioned(&self, transaction: ResourceRef, transition: Transition) {
        self.publish_event(FlowEvent::SaleTransitioned {
            transaction,
            transition,
        })
        .await;
    }

    /// Publish a message sent event
    pub async fn publish_message_sent(&self, transaction: ResourceRef, message_id: Uuid) {
        self.publish_event(FlowEvent::MessageSent {
            transaction,
            message_id,
        })
        .await;
    }

    /// Publish a review submitted event
    pub async fn publish_review_submitted(&self, transaction: ResourceRef, transition: Transition) {
        self.publish_event(FlowEvent::ReviewSubmitted {
            transaction,
            transition,
        })
        .await;
    }

    /// Publish a payout account saved event
    pub async fn publish_payout_account_saved(&self, user_id: Uuid) {
        self.publish_event(FlowEvent::PayoutAccountSaved { user_id })
            .await;
    }

    /// Publish a notification count changed event
    pub async fn publish_notification_count_changed(&self, count: u64) {
        self.publish_event(FlowEvent::NotificationCountChanged { count })
            .await;
    }

    /// Publish an event to all subscribers
    async fn publish_event(&self, event: FlowEvent) {
        // Send to channel
        let _ = self.sender.send(event.clone());

        // Handlers may publish follow-up events; take a snapshot of the
        // subscriber list instead of holding the lock across their awaits.
        let subscribers = self.subscribers.read().await.clone();
        for subscriber in subscribers.iter() {
            subscriber.handle_event(event.clone()).await;
        }
    }
}
