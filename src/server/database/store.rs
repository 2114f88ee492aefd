use chrono::NaiveDate;
use derive_more::{Display, Error};
use crate::server::kot::allocator::TicketAllocator;
use crate::server::model::identity::StoredCredential;
use crate::server::model::kot::{KotLine, LineScope, NewKotLine};
use crate::server::model::reference::MenuItem;
use crate::server::model::summary::OrderSummary;
use crate::server::model::{LineId, TicketNumber, UserId};

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("store unavailable: {reason}")]
    Unavailable { reason: String },
    #[display("store is busy")]
    Busy,
    #[display("conflicting concurrent write: {reason}")]
    Conflict { reason: String },
    #[display("store operation timed out")]
    Timeout,
    #[display("store query failed: {reason}")]
    Query { reason: String },
}

/// Everything the ticket workflow needs from persistence.
pub(crate) trait KotStore: Clone + 'static {
    type Transaction: KotTransaction;

    /// Open a submission transaction on a connection held until commit or rollback.
    async fn begin(&self) -> Result<Self::Transaction, StoreError>;

    /// Flag one line as cancelled, returns the number of rows touched.
    async fn cancel_line(&self, id: LineId) -> Result<u64, StoreError>;

    /// Distinct ticket numbers created within `[from, to]`, newest first.
    async fn ticket_numbers_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TicketNumber>, StoreError>;

    async fn ticket_lines(&self, kot_no: TicketNumber, scope: LineScope) -> Result<Vec<KotLine>, StoreError>;

    async fn latest_ticket_for_user(&self, user_id: UserId) -> Result<Option<TicketNumber>, StoreError>;

    async fn find_credential(&self, username: &str) -> Result<Option<StoredCredential>, StoreError>;

    async fn menu_sections(&self) -> Result<Vec<String>, StoreError>;

    async fn menu_items(&self, section: &str) -> Result<Vec<MenuItem>, StoreError>;

    async fn order_types(&self) -> Result<Vec<String>, StoreError>;

    async fn table_names(&self) -> Result<Vec<String>, StoreError>;
}

/// A unit of work nothing outside can observe until `commit`.
/// Dropping it without committing rolls everything back.
pub(crate) trait KotTransaction: TicketAllocator {
    async fn insert_line(&mut self, line: &NewKotLine<'_>) -> Result<(), StoreError>;

    async fn insert_summary(&mut self, summary: &OrderSummary) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self);
}
