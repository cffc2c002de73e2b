//! Payout account details.
//!
//! Providers receive payouts through a token account stored on the
//! current user's protected profile data. The flow patches that single
//! field and keeps the cached current user in sync with the copy the
//! platform returns.

use std::sync::Arc;

use quayside_api::ResourceType;
use quayside_client::{CurrentUserApi, UpdateProfileParams};
use serde_json::json;
use tokio::sync::RwLock;

use crate::cache::EntityCache;
use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::state::StoredError;

/// Protected-data key holding the provider's token account.
const TOKEN_ACCOUNT_KEY: &str = "tokenAccount";

/// Image variants requested for the profile image side-loaded with the
/// updated user.
pub const PROFILE_IMAGE_VARIANTS: &[&str] = &["variants.square-small", "variants.square-small2x"];

/// Payout settings view of the workflow state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutState {
    pub save_in_progress: bool,
    pub save_error: Option<StoredError>,
    pub account_saved: bool,
}

/// State transitions of [`PayoutState`].
#[derive(Debug, Clone, PartialEq)]
enum PayoutEvent {
    Request,
    Success,
    Error { error: StoredError },
    Clear,
}

impl PayoutState {
    /// Apply one event and return the next state.
    fn apply(&self, event: PayoutEvent) -> PayoutState {
        let mut next = self.clone();
        match event {
            PayoutEvent::Request => {
                next.save_in_progress = true;
                next.save_error = None;
                next.account_saved = false;
            }
            PayoutEvent::Success => {
                next.save_in_progress = false;
                next.account_saved = true;
            }
            PayoutEvent::Error { error } => {
                next.save_in_progress = false;
                next.save_error = Some(error);
            }
            PayoutEvent::Clear => next = PayoutState::default(),
        }
        next
    }
}

/// Controller for the payout settings page.
pub struct PayoutFlow {
    api: Arc<dyn CurrentUserApi>,
    cache: Arc<EntityCache>,
    events: Arc<EventBus>,
    state: RwLock<PayoutState>,
}

impl PayoutFlow {
    /// Create a payout flow over the given API client, cache, and bus.
    pub fn new(
        api: Arc<dyn CurrentUserApi>,
        cache: Arc<EntityCache>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            api,
            cache,
            events,
            state: RwLock::new(PayoutState::default()),
        }
    }

    /// Snapshot of the flow's state.
    pub async fn state(&self) -> PayoutState {
        self.state.read().await.clone()
    }

    /// Reset the flow, dropping any stored error and the saved flag.
    pub async fn clear(&self) {
        self.reduce(PayoutEvent::Clear).await;
    }

    /// The token account on the cached current user's protected data.
    pub fn current_account(&self) -> Option<String> {
        let user = self.cache.current_user()?;
        user.as_user()?
            .profile
            .as_ref()?
            .protected_data
            .as_ref()?
            .get(TOKEN_ACCOUNT_KEY)?
            .as_str()
            .map(str::to_owned)
    }

    /// Save the token account on the current user's protected data.
    ///
    /// Saving the value already on file is a no-op that leaves the state
    /// untouched. The platform answers the profile update with the updated
    /// user and nothing else; any other response shape is an error.
    pub async fn save_token_account(&self, account: &str) -> Result<()> {
        if self.current_account().as_deref() == Some(account) {
            return Ok(());
        }

        {
            let mut state = self.state.write().await;
            if state.save_in_progress {
                return Err(Error::AlreadyPending("save_token_account"));
            }
            *state = state.apply(PayoutEvent::Request);
        }

        let params = UpdateProfileParams::protected_data(json!({ TOKEN_ACCOUNT_KEY: account }))
            .with_include(["profileImage"])
            .with_image_fields(PROFILE_IMAGE_VARIANTS.iter().copied())
            .expanded();
        let response = match self.api.update_profile(params).await {
            Ok(response) => response,
            Err(error) => {
                self.reduce(PayoutEvent::Error {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error.into());
            }
        };

        let user_id = match response.items() {
            [user] if user.resource_type() == ResourceType::CurrentUser => user.id(),
            _ => {
                let error = Error::MissingEntity("current user");
                self.reduce(PayoutEvent::Error {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error);
            }
        };

        self.cache.add_response(&response);
        self.reduce(PayoutEvent::Success).await;
        self.events.publish_payout_account_saved(user_id).await;
        Ok(())
    }

    async fn reduce(&self, event: PayoutEvent) {
        let mut state = self.state.write().await;
        *state = state.apply(event);
    }
}
