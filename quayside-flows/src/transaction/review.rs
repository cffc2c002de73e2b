//! Review handshake.
//!
//! Reviews close a completed sale in two steps: whichever party reviews
//! first moves the transaction into a reviewed-by-one state, and the other
//! party's review then finishes it. The submitting side cannot always know
//! its own position, so a first-mover attempt the platform rejects as an
//! invalid transition is retried once as the second-mover transition.

use quayside_api::{ResourceRef, TransactionRole, Transition};
use quayside_client::{ReviewParams, TransitionParams};
use uuid::Uuid;

use super::TransactionFlow;
use crate::error::Result;
use crate::state::{StateEvent, StoredError};

/// Related resources side-loaded with a review transition response.
pub const REVIEW_TRANSACTION_INCLUDES: &[&str] = &["reviews", "reviews.author", "reviews.subject"];

impl TransactionFlow {
    /// Submit the acting party's review of the other party.
    ///
    /// When the cached transaction already shows the other party's review,
    /// the submission goes straight out as the second review. Otherwise it
    /// is attempted as the first review, falling back to the second exactly
    /// once when the platform rejects the first-mover transition.
    pub async fn send_review(
        &self,
        id: Uuid,
        role: TransactionRole,
        rating: u8,
        content: impl Into<String>,
    ) -> Result<ResourceRef> {
        self.reduce(StateEvent::SendReviewRequest).await;

        let review = ReviewParams {
            review_rating: rating,
            review_content: content.into(),
        };

        if self.other_party_reviewed_first(id, role) {
            self.review_as_second(id, role, review).await
        } else {
            self.review_as_first(id, role, review).await
        }
    }

    /// First-mover attempt. A rejection for an invalid transition means the
    /// other party's review landed after the transaction was fetched; the
    /// attempt is retried as the second review, and only that retry's
    /// outcome is stored and reported.
    async fn review_as_first(
        &self,
        id: Uuid,
        role: TransactionRole,
        review: ReviewParams,
    ) -> Result<ResourceRef> {
        match self
            .submit_review(id, Transition::review_first(role), review.clone())
            .await
        {
            Ok(transaction) => Ok(transaction),
            Err(error) if error.is_transition_invalid() => {
                self.review_as_second(id, role, review).await
            }
            Err(error) => {
                self.reduce(StateEvent::SendReviewError {
                    error: StoredError::from(&error),
                })
                .await;
                Err(error)
            }
        }
    }

    async fn review_as_second(
        &self,
        id: Uuid,
        role: TransactionRole,
        review: ReviewParams,
    ) -> Result<ResourceRef> {
        match self
            .submit_review(id, Transition::review_second(role), review)
            .await
        {
            Ok(transaction) => Ok(transaction),
            Err(error) => {
                self.reduce(StateEvent::SendReviewError {
                    error: StoredError::from(&error),
                })
                .await;
                Err(error)
            }
        }
    }

    /// Send one review transition, cache its response, and reduce success.
    async fn submit_review(
        &self,
        id: Uuid,
        transition: Transition,
        review: ReviewParams,
    ) -> Result<ResourceRef> {
        let params = TransitionParams::review(id, transition, review)
            .with_include(REVIEW_TRANSACTION_INCLUDES.iter().copied())
            .expanded();
        let response = self.api.transition_transaction(params).await?;

        self.cache.add_response(&response);
        self.reduce(StateEvent::SendReviewSuccess).await;

        let transaction = ResourceRef::transaction(id);
        self.events
            .publish_review_submitted(transaction, transition)
            .await;
        Ok(transaction)
    }

    /// Whether the cached transaction's last transition is the other
    /// party's first review.
    fn other_party_reviewed_first(&self, id: Uuid, role: TransactionRole) -> bool {
        let last_transition = self
            .cache
            .transaction(id)
            .as_ref()
            .and_then(|resource| resource.as_transaction())
            .map(|attributes| attributes.last_transition);
        last_transition == Some(Transition::review_first(role.other()))
    }
}
