//! Integration tests for transaction loading and the accept/decline
//! decision:
//! - Page load fetches the transaction and first message page together
//! - Listing enrichment is best-effort and skipped for deleted listings
//! - Accept/decline merge entities, publish events, and refresh the
//!   notification count
//! - Overlapping decisions are refused before any request is issued

mod support;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use quayside_api::ResourceRef;
use quayside_flows::{Error, FlowEvent, NotificationRefresher};
use support::*;
use uuid::Uuid;

#[tokio::test]
async fn test_load_fetches_transaction_and_first_message_page() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, cache, events) = new_flow(api.clone());
    let mut received = events.subscribe_channel();

    api.script_show_transaction(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Request,
    ))
    .with_included(vec![
        berth_listing(listing, "Berth 12, east pier"),
        member(customer, "Anna"),
        member(provider, "Jorma"),
    ])));
    api.script_show_listing(Ok(quayside_api::ApiResponse::one(enriched_listing(
        listing,
    ))));
    api.script_query_messages(Ok(message_page(
        vec![chat_message(Uuid::new_v4(), customer, "Is the berth still free?")],
        vec![member(customer, "Anna")],
        meta(1, 1, 1),
    )));

    let loaded = flow.load(tx).await.unwrap();
    assert_eq!(loaded, ResourceRef::transaction(tx));

    let state = flow.state().await;
    assert_eq!(state.transaction_ref, Some(ResourceRef::transaction(tx)));
    assert!(!state.fetch_transaction_in_progress);
    assert!(state.fetch_transaction_error.is_none());
    assert_eq!(state.messages.len(), 1);
    assert_eq!(
        state.messages[0].sender.as_ref().unwrap().display_name.as_deref(),
        Some("Anna")
    );
    assert_eq!(state.total_messages, 1);
    assert_eq!(state.oldest_message_page_fetched, 1);

    // The enriched copy, fetched second, wins in the cache.
    let cached = cache.listing(listing).unwrap();
    assert!(cached.as_listing().unwrap().description.is_some());

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::ShowTransaction {
                id: tx,
                include: strings(quayside_flows::TRANSACTION_INCLUDES),
                expand: true,
            },
            ApiCall::ShowListing {
                id: listing,
                include: strings(quayside_flows::LISTING_INCLUDES),
            },
            ApiCall::QueryMessages {
                transaction_id: tx,
                page: 1,
                per_page: 100,
            },
        ]
    );

    assert_eq!(
        received.try_recv().unwrap(),
        FlowEvent::TransactionFetched {
            transaction: ResourceRef::transaction(tx)
        }
    );
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_listing_enrichment_failure_keeps_fetch_successful() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, cache, _events) = new_flow(api.clone());

    api.script_show_transaction(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Request,
    ))
    .with_included(vec![berth_listing(listing, "Berth 12, east pier")])));
    api.script_show_listing(Err(api_error(500, quayside_api::ErrorCode::Other(
        "internal".to_string(),
    ))));

    flow.fetch_transaction(tx).await.unwrap();

    let state = flow.state().await;
    assert!(state.fetch_transaction_error.is_none());
    assert_eq!(state.transaction_ref, Some(ResourceRef::transaction(tx)));

    // The embedded copy from the transaction response is all we have.
    let cached = cache.listing(listing).unwrap();
    assert_eq!(
        cached.as_listing().unwrap().title.as_deref(),
        Some("Berth 12, east pier")
    );
    assert_eq!(api.calls_to("show_listing").len(), 1);
}

#[tokio::test]
async fn test_deleted_listing_skips_enrichment() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, _cache, _events) = new_flow(api.clone());

    api.script_show_transaction(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Request,
    ))
    .with_included(vec![deleted_listing(listing)])));

    flow.fetch_transaction(tx).await.unwrap();

    assert!(api.calls_to("show_listing").is_empty());
}

#[tokio::test]
async fn test_fetch_transaction_rejection_stores_error() {
    let tx = Uuid::new_v4();
    let api = MockApi::new();
    let (flow, _cache, events) = new_flow(api.clone());
    let mut received = events.subscribe_channel();

    api.script_show_transaction(Err(api_error(404, quayside_api::ErrorCode::NotFound)));

    let result = flow.fetch_transaction(tx).await;
    assert_matches!(result, Err(Error::Client(_)));

    let state = flow.state().await;
    assert!(!state.fetch_transaction_in_progress);
    let stored = state.fetch_transaction_error.unwrap();
    assert_eq!(stored.status, Some(404));
    assert_eq!(stored.code.as_deref(), Some("not-found"));
    assert!(state.transaction_ref.is_none());
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_accept_sale_merges_entities_and_refreshes_notifications() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, cache, events) = new_flow(api.clone());
    // A non-default page size must flow from the config into the query.
    let config = quayside_flows::FlowConfig::default().with_notification_page_size(5);
    let refresher = NotificationRefresher::new(api.clone(), Arc::clone(&events), &config);
    events.subscribe(Arc::new(refresher)).await;
    let mut received = events.subscribe_channel();

    api.script_transition(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Accept,
    ))));
    api.script_query_transactions(Ok(quayside_api::ApiResponse::page(vec![], meta(3, 1, 1))));

    flow.accept_sale(tx).await.unwrap();

    let state = flow.state().await;
    assert!(!state.accept_in_progress);
    assert!(state.accept_error.is_none());
    assert_eq!(
        cache
            .transaction(tx)
            .unwrap()
            .as_transaction()
            .unwrap()
            .last_transition,
        quayside_api::Transition::Accept
    );

    assert_eq!(
        api.calls_to("query_transactions"),
        vec![ApiCall::QueryTransactions {
            only: Some(quayside_client::TransactionSide::Sale),
            last_transitions: vec![quayside_api::Transition::Request],
            page: Some(1),
            per_page: Some(5),
        }]
    );

    assert_eq!(
        received.try_recv().unwrap(),
        FlowEvent::SaleTransitioned {
            transaction: ResourceRef::transaction(tx),
            transition: quayside_api::Transition::Accept,
        }
    );
    assert_eq!(
        received.try_recv().unwrap(),
        FlowEvent::NotificationCountChanged { count: 3 }
    );
}

#[tokio::test]
async fn test_decline_rejection_stores_error_and_clears_flag() {
    let tx = Uuid::new_v4();
    let api = MockApi::new();
    let (flow, _cache, events) = new_flow(api.clone());
    let mut received = events.subscribe_channel();

    api.script_transition(Err(api_error(403, quayside_api::ErrorCode::Forbidden)));

    let result = flow.decline_sale(tx).await;
    assert_matches!(result, Err(Error::Client(_)));

    let state = flow.state().await;
    assert!(!state.decline_in_progress);
    assert_eq!(state.decline_error.unwrap().status, Some(403));
    assert!(state.accept_error.is_none());
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_notification_refresh_failure_never_surfaces() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, _cache, events) = new_flow(api.clone());
    let refresher = NotificationRefresher::new(
        api.clone(),
        Arc::clone(&events),
        &quayside_flows::FlowConfig::default(),
    );
    events.subscribe(Arc::new(refresher)).await;
    let mut received = events.subscribe_channel();

    api.script_transition(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Accept,
    ))));
    api.script_query_transactions(Err(api_error(500, quayside_api::ErrorCode::Other(
        "internal".to_string(),
    ))));

    // The decision still succeeds; only the count event is missing.
    flow.accept_sale(tx).await.unwrap();

    assert_matches!(
        received.try_recv().unwrap(),
        FlowEvent::SaleTransitioned { .. }
    );
    assert!(received.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_decisions_are_refused_without_a_request() {
    let (tx, listing, customer, provider) = ids();
    let api = MockApi::new();
    let (flow, _cache, _events) = new_flow(api.clone());
    let flow = Arc::new(flow);

    api.delay_transitions(Duration::from_millis(50));
    api.script_transition(Ok(quayside_api::ApiResponse::one(sale_transaction(
        tx,
        listing,
        customer,
        provider,
        quayside_api::Transition::Accept,
    ))));

    let accept = tokio::spawn({
        let flow = Arc::clone(&flow);
        async move { flow.accept_sale(tx).await }
    });
    tokio::task::yield_now().await;
    assert!(flow.state().await.accept_in_progress);

    let refused = flow.decline_sale(tx).await;
    assert_matches!(refused, Err(Error::AlreadyPending(_)));

    // The refused decline left no trace: no request, no stored error.
    let state = flow.state().await;
    assert!(!state.decline_in_progress);
    assert!(state.decline_error.is_none());

    accept.await.unwrap().unwrap();
    assert_eq!(api.calls_to("transition").len(), 1);
    assert!(!flow.state().await.accept_in_progress);
}

/// Helper producing distinct transaction, listing, customer, and provider
/// ids.
fn ids() -> (Uuid, Uuid, Uuid, Uuid) {
    (
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
    )
}

/// A listing copy with more attributes than the embedded one, standing in
/// for the expanded enrichment response.
fn enriched_listing(id: Uuid) -> quayside_api::Resource {
    quayside_api::Resource::listing(
        id,
        quayside_api::ListingAttributes {
            title: Some("Berth 12, east pier".to_string()),
            description: Some("Sheltered berth with shore power.".to_string()),
            ..Default::default()
        },
    )
}
