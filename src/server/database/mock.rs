//! In-memory stand-ins for PostgreSQL, test builds only.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;
use tokio::task::yield_now;
use crate::server::database::gateway::Connector;
use crate::server::database::store::{KotStore, KotTransaction, StoreError};
use crate::server::kot::allocator::TicketAllocator;
use crate::server::model::identity::StoredCredential;
use crate::server::model::kot::{KotLine, LineScope, NewKotLine};
use crate::server::model::reference::MenuItem;
use crate::server::model::summary::OrderSummary;
use crate::server::model::{LineId, TicketNumber, UserId};

#[derive(Clone, Default)]
pub(crate) struct MockClient {
    closed: Arc<AtomicBool>,
}

impl MockClient {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    connects: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// fail the next `n` connection attempts
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

impl Connector for MockConnector {
    type Client = MockClient;

    async fn connect(&self) -> Result<MockClient, StoreError> {
        yield_now().await;
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            });
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MockClient::default())
    }

    fn is_closed(client: &MockClient) -> bool {
        client.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct MockState {
    pub counter: TicketNumber,
    pub lines: Vec<KotLine>,
    pub summaries: Vec<OrderSummary>,
    pub credentials: Vec<StoredCredential>,
    pub menu: Vec<(String, MenuItem)>,
    pub order_types: Vec<String>,
    pub tables: Vec<String>,
    pub begun: usize,
    pub commits: usize,
    pub rollbacks: usize,
    /// every call fails as if the server were down
    pub unavailable: bool,
    /// fail the insert of the n-th line (0 based) of every transaction
    pub fail_line_at: Option<usize>,
    pub fail_summary: bool,
    /// fail the next n commits with a conflict
    pub conflicts: usize,
    /// stall each transactional step, for timeout tests
    pub stall: Option<std::time::Duration>,
    next_line_id: LineId,
}

/// Allocation mirrors the `kot_counter` row lock: the lock is taken by the
/// allocating transaction and held until it commits, rolls back or is dropped.
#[derive(Clone, Default)]
pub(crate) struct MockStore {
    state: Arc<Mutex<MockState>>,
    ticket_lock: Arc<tokio::sync::Mutex<()>>,
}

impl MockStore {
    pub fn with_counter(counter: TicketNumber) -> Self {
        let store = Self::default();
        store.state().counter = counter;
        store
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.state().unavailable {
            return Err(StoreError::Unavailable {
                reason: "mock store is down".to_string(),
            });
        }
        Ok(())
    }

    async fn step(&self) -> Result<(), StoreError> {
        let stall = self.state().stall;
        match stall {
            Some(duration) => tokio::time::sleep(duration).await,
            None => yield_now().await,
        }
        self.check()
    }
}

pub(crate) struct MockTransaction {
    store: MockStore,
    counter_lock: Option<OwnedMutexGuard<()>>,
    kot_no: Option<TicketNumber>,
    lines: Vec<KotLine>,
    summary: Option<OrderSummary>,
}

impl TicketAllocator for MockTransaction {
    async fn next_ticket_number(&mut self) -> Result<TicketNumber, StoreError> {
        self.store.step().await?;
        if self.counter_lock.is_none() {
            self.counter_lock = Some(self.store.ticket_lock.clone().lock_owned().await);
        }
        let next = self.store.state().counter + 1;
        self.kot_no = Some(next);
        Ok(next)
    }
}

impl KotTransaction for MockTransaction {
    async fn insert_line(&mut self, line: &NewKotLine<'_>) -> Result<(), StoreError> {
        self.store.step().await?;
        if self.store.state().fail_line_at == Some(self.lines.len()) {
            return Err(StoreError::Query {
                reason: "check constraint violated".to_string(),
            });
        }
        self.lines.push(KotLine {
            id: 0,
            kot_no: line.kot_no,
            created_at: line.created_at,
            menu_section: line.header.menu_section.clone(),
            order_type: line.header.order_type.clone(),
            table_id: line.header.table_id.clone(),
            item_code: line.item.code.clone(),
            description: line.item.description.clone(),
            quantity: line.item.quantity,
            unit_price: line.item.unit_price,
            line_total: line.item.line_total,
            remarks: line.item.remarks.clone(),
            cancelled: false,
            user_id: line.header.user_id,
        });
        Ok(())
    }

    async fn insert_summary(&mut self, summary: &OrderSummary) -> Result<(), StoreError> {
        self.store.step().await?;
        if self.store.state().fail_summary {
            return Err(StoreError::Query {
                reason: "summary insert failed".to_string(),
            });
        }
        self.summary = Some(summary.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.store.step().await?;
        let mut state = self.store.state();
        if state.conflicts > 0 {
            state.conflicts -= 1;
            return Err(StoreError::Conflict {
                reason: "could not serialize access".to_string(),
            });
        }
        if let Some(kot_no) = self.kot_no {
            if state.summaries.iter().any(|s| s.kot_no == kot_no) || state.lines.iter().any(|l| l.kot_no == kot_no) {
                return Err(StoreError::Conflict {
                    reason: format!("kot_no {kot_no} already committed"),
                });
            }
            state.counter = state.counter.max(kot_no);
        }
        for mut line in self.lines {
            state.next_line_id += 1;
            line.id = state.next_line_id;
            state.lines.push(line);
        }
        if let Some(summary) = self.summary {
            state.summaries.push(summary);
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) {
        self.store.state().rollbacks += 1;
    }
}

impl KotStore for MockStore {
    type Transaction = MockTransaction;

    async fn begin(&self) -> Result<MockTransaction, StoreError> {
        self.step().await?;
        self.state().begun += 1;
        Ok(MockTransaction {
            store: self.clone(),
            counter_lock: None,
            kot_no: None,
            lines: vec![],
            summary: None,
        })
    }

    async fn cancel_line(&self, id: LineId) -> Result<u64, StoreError> {
        self.step().await?;
        let mut state = self.state();
        let mut touched = 0;
        for line in state.lines.iter_mut().filter(|l| l.id == id) {
            line.cancelled = true;
            touched += 1;
        }
        Ok(touched)
    }

    async fn ticket_numbers_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TicketNumber>, StoreError> {
        self.step().await?;
        let mut numbers = self
            .state()
            .lines
            .iter()
            .filter(|l| (from..=to).contains(&l.created_at.date_naive()))
            .map(|l| l.kot_no)
            .collect::<Vec<_>>();
        numbers.sort_unstable_by(|a, b| b.cmp(a));
        numbers.dedup();
        Ok(numbers)
    }

    async fn ticket_lines(&self, kot_no: TicketNumber, scope: LineScope) -> Result<Vec<KotLine>, StoreError> {
        self.step().await?;
        Ok(self
            .state()
            .lines
            .iter()
            .filter(|l| l.kot_no == kot_no && (scope == LineScope::All || !l.cancelled))
            .cloned()
            .collect())
    }

    async fn latest_ticket_for_user(&self, user_id: UserId) -> Result<Option<TicketNumber>, StoreError> {
        self.step().await?;
        Ok(self
            .state()
            .lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .max_by_key(|l| (l.created_at, l.kot_no))
            .map(|l| l.kot_no))
    }

    async fn find_credential(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        self.step().await?;
        Ok(self
            .state()
            .credentials
            .iter()
            .find(|c| c.username == username)
            .cloned())
    }

    async fn menu_sections(&self) -> Result<Vec<String>, StoreError> {
        self.step().await?;
        let mut sections = self
            .state()
            .menu
            .iter()
            .map(|(section, _)| section.clone())
            .collect::<Vec<_>>();
        sections.sort();
        sections.dedup();
        Ok(sections)
    }

    async fn menu_items(&self, section: &str) -> Result<Vec<MenuItem>, StoreError> {
        self.step().await?;
        Ok(self
            .state()
            .menu
            .iter()
            .filter(|(s, _)| s == section)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn order_types(&self) -> Result<Vec<String>, StoreError> {
        self.step().await?;
        Ok(self.state().order_types.clone())
    }

    async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        self.step().await?;
        Ok(self.state().tables.clone())
    }
}
