//! Ticket number allocation.
//!
//! Numbers come from the single row of `kot_counter`. The `UPDATE` takes the
//! row lock and holds it until the submission commits or rolls back, so a
//! concurrent submission waits and then reads the advanced value. A rolled back
//! submission releases its number together with the lock.

use log::debug;
use crate::server::database::store::StoreError;
use crate::server::model::TicketNumber;

pub(crate) const ALLOCATE_TICKET_SQL: &str = r#"
    UPDATE kot_counter
    SET last_value = last_value + 1
    WHERE id = 1
    RETURNING last_value
"#;

/// Hands out the next ticket number inside an open transaction.
pub(crate) trait TicketAllocator {
    async fn next_ticket_number(&mut self) -> Result<TicketNumber, StoreError>;
}

/// Allocate exactly once per submission, before any line is written.
pub(crate) async fn allocate<A: TicketAllocator>(tx: &mut A) -> Result<TicketNumber, StoreError> {
    let kot_no = tx.next_ticket_number().await?;
    if kot_no <= 0 {
        return Err(StoreError::Query {
            reason: format!("ticket counter returned non-positive value {kot_no}"),
        });
    }
    debug!("allocated kot_no={}", kot_no);
    Ok(kot_no)
}
