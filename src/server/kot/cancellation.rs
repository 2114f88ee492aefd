use log::{info, warn};
use crate::server::database::store::KotStore;
use crate::server::kot::KotError;
use crate::server::model::LineId;

pub(crate) struct CancellationManager<S: KotStore> {
    store: S,
}

impl<S: KotStore> CancellationManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Flag one line as cancelled. Setting the flag again is a no-op, so
    /// callers may retry freely. The ticket summary is left untouched.
    pub async fn cancel(&self, line_id: Option<LineId>) -> Result<(), KotError> {
        let line_id = match line_id {
            Some(id) if id > 0 => id,
            _ => return Err(KotError::validation("line item id is required")),
        };
        match self.store.cancel_line(line_id).await? {
            0 => warn!("cancel requested for unknown kot line id={}", line_id),
            _ => info!("kot line id={} cancelled", line_id),
        }
        Ok(())
    }
}
