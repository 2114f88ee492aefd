use chrono::NaiveDate;
use crate::server::database::store::KotStore;
use crate::server::kot::KotError;
use crate::server::model::kot::{KotLine, LineScope, PrintView};
use crate::server::model::{TicketNumber, UserId};

/// Read side of the ticket workflow. Printing never includes cancelled lines,
/// the detail view keeps them for audit.
pub(crate) struct RetrievalService<S: KotStore> {
    store: S,
}

impl<S: KotStore> RetrievalService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_tickets(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<TicketNumber>, KotError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(KotError::validation("fromDate and toDate are required"));
        };
        Ok(self.store.ticket_numbers_between(from, to).await?)
    }

    pub async fn ticket_detail(&self, kot_no: TicketNumber) -> Result<Vec<KotLine>, KotError> {
        let lines = self.store.ticket_lines(kot_no, LineScope::All).await?;
        if lines.is_empty() {
            return Err(KotError::not_found(format!("kot {kot_no}")));
        }
        Ok(lines)
    }

    /// Latest ticket of `user_id`, by creation time.
    pub async fn print_for_user(&self, user_id: Option<UserId>) -> Result<PrintView, KotError> {
        let Some(user_id) = user_id else {
            return Err(KotError::validation("user id is required"));
        };
        let Some(kot_no) = self.store.latest_ticket_for_user(user_id).await? else {
            return Err(KotError::not_found(format!("kot for user {user_id}")));
        };
        let items = self.store.ticket_lines(kot_no, LineScope::Active).await?;
        Ok(PrintView { kot_no, items })
    }

    pub async fn print_for_ticket(&self, kot_no: TicketNumber) -> Result<PrintView, KotError> {
        let items = self.store.ticket_lines(kot_no, LineScope::Active).await?;
        if items.is_empty() {
            return Err(KotError::not_found(format!("printable items for kot {kot_no}")));
        }
        Ok(PrintView { kot_no, items })
    }
}
