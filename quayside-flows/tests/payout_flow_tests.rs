//! Integration tests for the payout account flow:
//! - Saving patches the token account into protected data and upserts the
//!   returned user into the cache
//! - Saving the value already on file is a no-op
//! - A response without exactly one current user is an error

mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use quayside_api::{ApiResponse, ErrorCode, Resource, UserAttributes, UserProfile};
use quayside_flows::{EntityCache, Error, EventBus, FlowEvent, PayoutFlow};
use serde_json::json;
use support::*;
use uuid::Uuid;

struct Harness {
    api: Arc<MockApi>,
    cache: Arc<EntityCache>,
    events: Arc<EventBus>,
    flow: PayoutFlow,
}

fn harness() -> Harness {
    let api = MockApi::new();
    let cache = Arc::new(EntityCache::new());
    let events = Arc::new(EventBus::new());
    let flow = PayoutFlow::new(api.clone(), Arc::clone(&cache), Arc::clone(&events));
    Harness {
        api,
        cache,
        events,
        flow,
    }
}

/// A current user whose protected data holds the given token account.
fn account_holder(id: Uuid, account: &str) -> Resource {
    Resource::current_user(
        id,
        UserAttributes {
            profile: Some(UserProfile {
                display_name: Some("Maret T".to_string()),
                protected_data: Some(json!({ "tokenAccount": account })),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_save_patches_protected_data_and_updates_the_cached_user() {
    let h = harness();
    let user = Uuid::new_v4();
    h.cache
        .add_response(&ApiResponse::one(account_holder(user, "0xq-old")));
    let mut received = h.events.subscribe_channel();

    h.api
        .script_update_profile(Ok(ApiResponse::one(account_holder(user, "0xq-new"))));

    h.flow.save_token_account("0xq-new").await.unwrap();

    assert_eq!(
        h.api.calls(),
        vec![ApiCall::UpdateProfile {
            protected_data: Some(json!({ "tokenAccount": "0xq-new" })),
            include: vec!["profileImage".to_string()],
        }]
    );

    let state = h.flow.state().await;
    assert!(!state.save_in_progress);
    assert!(state.save_error.is_none());
    assert!(state.account_saved);

    // The returned copy replaced the cached one.
    assert_eq!(h.flow.current_account().as_deref(), Some("0xq-new"));
    assert_eq!(
        received.try_recv().unwrap(),
        FlowEvent::PayoutAccountSaved { user_id: user }
    );
}

#[tokio::test]
async fn test_saving_the_value_on_file_is_a_no_op() {
    let h = harness();
    h.cache
        .add_response(&ApiResponse::one(account_holder(Uuid::new_v4(), "0xq-kept")));

    h.flow.save_token_account("0xq-kept").await.unwrap();

    assert!(h.api.calls().is_empty());
    assert_eq!(h.flow.state().await, quayside_flows::PayoutState::default());
}

#[tokio::test]
async fn test_response_without_exactly_one_user_is_an_error() {
    let h = harness();

    h.api
        .script_update_profile(Ok(ApiResponse::page(vec![], meta(0, 0, 1))));

    let result = h.flow.save_token_account("0xq-new").await;
    assert_matches!(result, Err(Error::MissingEntity(_)));

    let state = h.flow.state().await;
    assert!(!state.save_in_progress);
    assert!(!state.account_saved);
    let stored = state.save_error.unwrap();
    assert!(stored.message.contains("current user"));
}

#[tokio::test]
async fn test_rejection_stores_the_error_and_clears_the_flag() {
    let h = harness();
    let mut received = h.events.subscribe_channel();

    h.api.script_update_profile(Err(api_error(
        400,
        ErrorCode::ValidationInvalidValue,
    )));

    let result = h.flow.save_token_account("not-an-account").await;
    assert_matches!(result, Err(Error::Client(_)));

    let state = h.flow.state().await;
    assert!(!state.save_in_progress);
    assert_eq!(state.save_error.unwrap().status, Some(400));
    assert!(!state.account_saved);
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_clear_resets_a_finished_flow() {
    let h = harness();
    let user = Uuid::new_v4();

    h.api
        .script_update_profile(Ok(ApiResponse::one(account_holder(user, "0xq-new"))));
    h.flow.save_token_account("0xq-new").await.unwrap();
    assert!(h.flow.state().await.account_saved);

    h.flow.clear().await;
    assert_eq!(h.flow.state().await, quayside_flows::PayoutState::default());
}
