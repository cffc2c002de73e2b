//! Transition vocabulary for the sale process.
//!
//! Transactions move through a fixed set of named transitions. The review
//! handshake at the end of the process depends on ordering: whichever party
//! reviews first uses a `review-1-*` transition and the other party closes
//! the handshake with the matching `review-2-*`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The two parties of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionRole {
    Customer,
    Provider,
}

impl TransactionRole {
    /// The counterparty role.
    pub fn other(&self) -> TransactionRole {
        match self {
            TransactionRole::Customer => TransactionRole::Provider,
            TransactionRole::Provider => TransactionRole::Customer,
        }
    }
}

impl fmt::Display for TransactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionRole::Customer => write!(f, "customer"),
            TransactionRole::Provider => write!(f, "provider"),
        }
    }
}

impl TryFrom<&str> for TransactionRole {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        match value {
            "customer" => Ok(TransactionRole::Customer),
            "provider" => Ok(TransactionRole::Provider),
            _ => Err(Error::UnknownRole(value.to_string())),
        }
    }
}

/// Named transitions of the sale process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    #[serde(rename = "transition/request")]
    Request,
    #[serde(rename = "transition/accept")]
    Accept,
    #[serde(rename = "transition/decline")]
    Decline,
    #[serde(rename = "transition/expire")]
    Expire,
    #[serde(rename = "transition/cancel")]
    Cancel,
    #[serde(rename = "transition/complete")]
    Complete,
    #[serde(rename = "transition/review-1-by-customer")]
    ReviewFirstByCustomer,
    #[serde(rename = "transition/review-2-by-customer")]
    ReviewSecondByCustomer,
    #[serde(rename = "transition/review-1-by-provider")]
    ReviewFirstByProvider,
    #[serde(rename = "transition/review-2-by-provider")]
    ReviewSecondByProvider,
}

impl Transition {
    /// The wire tag of the transition.
    pub fn tag(&self) -> &'static str {
        match self {
            Transition::Request => "transition/request",
            Transition::Accept => "transition/accept",
            Transition::Decline => "transition/decline",
            Transition::Expire => "transition/expire",
            Transition::Cancel => "transition/cancel",
            Transition::Complete => "transition/complete",
            Transition::ReviewFirstByCustomer => "transition/review-1-by-customer",
            Transition::ReviewSecondByCustomer => "transition/review-2-by-customer",
            Transition::ReviewFirstByProvider => "transition/review-1-by-provider",
            Transition::ReviewSecondByProvider => "transition/review-2-by-provider",
        }
    }

    /// The first-mover review transition for the given role.
    pub fn review_first(role: TransactionRole) -> Transition {
        match role {
            TransactionRole::Customer => Transition::ReviewFirstByCustomer,
            TransactionRole::Provider => Transition::ReviewFirstByProvider,
        }
    }

    /// The second-mover review transition for the given role.
    pub fn review_second(role: TransactionRole) -> Transition {
        match role {
            TransactionRole::Customer => Transition::ReviewSecondByCustomer,
            TransactionRole::Provider => Transition::ReviewSecondByProvider,
        }
    }

    /// Whether the transition is part of the review handshake.
    pub fn is_review(&self) -> bool {
        matches!(
            self,
            Transition::ReviewFirstByCustomer
                | Transition::ReviewSecondByCustomer
                | Transition::ReviewFirstByProvider
                | Transition::ReviewSecondByProvider
        )
    }

    /// Transitions that leave a sale waiting on the provider's decision.
    ///
    /// Notification counts are computed from sales whose last transition is
    /// in this set.
    pub fn requiring_attention() -> &'static [Transition] {
        &[Transition::Request]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl TryFrom<&str> for Transition {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        match value {
            "transition/request" => Ok(Transition::Request),
            "transition/accept" => Ok(Transition::Accept),
            "transition/decline" => Ok(Transition::Decline),
            "transition/expire" => Ok(Transition::Expire),
            "transition/cancel" => Ok(Transition::Cancel),
            "transition/complete" => Ok(Transition::Complete),
            "transition/review-1-by-customer" => Ok(Transition::ReviewFirstByCustomer),
            "transition/review-2-by-customer" => Ok(Transition::ReviewSecondByCustomer),
            "transition/review-1-by-provider" => Ok(Transition::ReviewFirstByProvider),
            "transition/review-2-by-provider" => Ok(Transition::ReviewSecondByProvider),
            _ => Err(Error::UnknownTransition(value.to_string())),
        }
    }
}
