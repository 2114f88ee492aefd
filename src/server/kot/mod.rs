//! Ticket (KOT) lifecycle: submission, cancellation, retrieval.

use derive_more::{Display, Error};
use crate::server::database::store::StoreError;

pub(crate) mod allocator;
pub(crate) mod cancellation;
pub(crate) mod coordinator;
pub(crate) mod retrieval;

#[derive(Debug, Display, Error)]
pub(crate) enum KotError {
    #[display("invalid request: {reason}")]
    Validation { reason: String },
    #[display("{what} not found")]
    NotFound { what: String },
    #[display("{source}")]
    Store { source: StoreError },
}

impl KotError {
    pub fn validation(reason: impl Into<String>) -> Self {
        KotError::Validation { reason: reason.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        KotError::NotFound { what: what.into() }
    }
}

impl From<StoreError> for KotError {
    fn from(source: StoreError) -> Self {
        KotError::Store { source }
    }
}
