use log::{error, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::time::timeout;
use crate::server::database::store::{KotStore, KotTransaction, StoreError};
use crate::server::kot::allocator;
use crate::server::kot::KotError;
use crate::server::model::config::KotSettings;
use crate::server::model::kot::{KotItemRequest, NewKotLine, OrderHeader, OrderItem, SubmitKotRequest, ValidatedOrder};
use crate::server::model::summary::{OrderSummary, SummaryDefaults};
use crate::server::model::TicketNumber;
use crate::server::util::time::helper::get_utc_now;

/// Turns a submission into one ticket: its line items plus the summary,
/// committed together or not at all.
pub(crate) struct OrderCoordinator<S: KotStore> {
    store: S,
    settings: KotSettings,
}

impl<S: KotStore> OrderCoordinator<S> {
    pub fn new(store: S, settings: KotSettings) -> Self {
        Self { store, settings }
    }

    /// Validate, then write the ticket. A conflicting concurrent commit is
    /// retried with a fresh ticket number, up to the configured attempts.
    pub async fn submit(&self, request: SubmitKotRequest) -> Result<TicketNumber, KotError> {
        let order = validate(request)?;
        let mut attempt = 1;
        loop {
            match timeout(self.settings.submit_timeout, self.write_ticket(&order)).await {
                Ok(Ok(kot_no)) => {
                    info!(
                        "saved kot_no={} with {} items for user_id={}",
                        kot_no,
                        order.items.len(),
                        order.header.user_id
                    );
                    return Ok(kot_no);
                }
                Ok(Err(StoreError::Conflict { reason })) if attempt < self.settings.max_submit_attempts => {
                    warn!("kot submission attempt {} conflicted, retrying, {}", attempt, reason);
                    attempt += 1;
                }
                Ok(Err(e)) => {
                    error!("kot submission failed, {}", e);
                    return Err(e.into());
                }
                Err(_) => {
                    error!("kot submission timed out after {:?}", self.settings.submit_timeout);
                    return Err(StoreError::Timeout.into());
                }
            }
        }
    }

    async fn write_ticket(&self, order: &ValidatedOrder) -> Result<TicketNumber, StoreError> {
        let mut tx = self.store.begin().await?;
        match write_rows(&mut tx, order, &self.settings.summary).await {
            Ok(kot_no) => {
                tx.commit().await?;
                Ok(kot_no)
            }
            Err(e) => {
                tx.rollback().await;
                Err(e)
            }
        }
    }
}

async fn write_rows<T: KotTransaction>(
    tx: &mut T,
    order: &ValidatedOrder,
    defaults: &SummaryDefaults,
) -> Result<TicketNumber, StoreError> {
    let kot_no = allocator::allocate(tx).await?;
    let created_at = get_utc_now();
    let mut gross = Decimal::ZERO;
    for item in &order.items {
        tx.insert_line(&NewKotLine {
            kot_no,
            created_at,
            header: &order.header,
            item,
        })
        .await?;
        gross += item.line_total;
    }
    tx.insert_summary(&OrderSummary::new(kot_no, order, gross, created_at, defaults))
        .await?;
    Ok(kot_no)
}

fn required(value: Option<String>, field: &str) -> Result<String, KotError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(KotError::validation(format!("{field} is required"))),
    }
}

/// Money columns hold two decimal places.
const MONEY_SCALE: u32 = 2;

/// Largest value of a `NUMERIC(10, 2)` line amount.
fn max_line_amount() -> Decimal {
    Decimal::new(9_999_999_999, MONEY_SCALE)
}

/// Largest value of a `NUMERIC(12, 2)` summary amount.
fn max_ticket_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Round to cents the way the store does, so the summed gross equals the sum
/// of the stored line amounts.
fn amount(value: Option<Decimal>, field: &str, index: usize) -> Result<Decimal, KotError> {
    let value = value.unwrap_or_default();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(KotError::validation(format!("item {index}: {field} must not be negative")));
    }
    let value = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if value > max_line_amount() {
        return Err(KotError::validation(format!(
            "item {index}: {field} must not exceed {}",
            max_line_amount()
        )));
    }
    Ok(value)
}

fn validate_item(index: usize, item: KotItemRequest) -> Result<OrderItem, KotError> {
    let quantity = item.quantity.unwrap_or(0);
    if quantity < 0 {
        return Err(KotError::validation(format!("item {index}: quantity must not be negative")));
    }
    Ok(OrderItem {
        code: item.code.unwrap_or_default(),
        description: item.description.unwrap_or_default(),
        quantity,
        unit_price: amount(item.unit_price, "unit price", index)?,
        line_total: amount(item.line_total, "line total", index)?,
        remarks: item.remarks.unwrap_or_default(),
    })
}

/// Checked before any store interaction, nothing is written on failure.
pub(crate) fn validate(request: SubmitKotRequest) -> Result<ValidatedOrder, KotError> {
    let header = OrderHeader {
        menu_section: required(request.menu_section, "menu section")?,
        order_type: required(request.order_type, "order type")?,
        table_id: required(request.table_id, "table")?,
        user_id: match request.user_id {
            Some(id) if id > 0 => id,
            _ => return Err(KotError::validation("user id is required")),
        },
    };
    let items = match request.items {
        Some(items) if !items.is_empty() => items,
        _ => return Err(KotError::validation("at least one item is required")),
    };
    let items = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item))
        .collect::<Result<Vec<_>, _>>()?;
    let gross: Decimal = items.iter().map(|i| i.line_total).sum();
    if gross > max_ticket_amount() {
        return Err(KotError::validation(format!(
            "ticket total must not exceed {}",
            max_ticket_amount()
        )));
    }
    Ok(ValidatedOrder { header, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use futures_util::future::join_all;
    use crate::server::database::mock::MockStore;

    fn item(qty: i32, price: i64, total: i64) -> KotItemRequest {
        KotItemRequest {
            code: Some(format!("C{price}")),
            description: Some(format!("dish {price}")),
            quantity: Some(qty),
            unit_price: Some(Decimal::from(price)),
            line_total: Some(Decimal::from(total)),
            remarks: None,
        }
    }

    fn request(items: Vec<KotItemRequest>) -> SubmitKotRequest {
        SubmitKotRequest {
            menu_section: Some("Starters".to_string()),
            order_type: Some("Dine-In".to_string()),
            table_id: Some("T1".to_string()),
            items: Some(items),
            user_id: Some(7),
        }
    }

    fn coordinator(store: &MockStore) -> OrderCoordinator<MockStore> {
        OrderCoordinator::new(store.clone(), KotSettings::default())
    }

    #[tokio::test]
    async fn submit_writes_lines_and_summary() {
        let store = MockStore::with_counter(40);
        let kot_no = coordinator(&store)
            .submit(request(vec![item(2, 100, 200), item(1, 50, 50)]))
            .await
            .unwrap();
        assert_eq!(kot_no, 41);

        let state = store.state();
        assert_eq!(state.lines.len(), 2);
        assert!(state.lines.iter().all(|l| l.kot_no == 41 && l.user_id == 7 && l.table_id == "T1"));
        assert_eq!(state.lines[0].quantity, 2);
        assert_eq!(state.lines[1].quantity, 1);
        assert_eq!(state.summaries.len(), 1);
        assert_eq!(state.summaries[0].kot_no, 41);
        assert_eq!(state.summaries[0].gross_amount, Decimal::from(250));
        assert_eq!(state.summaries[0].nett_amount, Decimal::from(250));
        assert_eq!(state.counter, 41);
    }

    #[tokio::test]
    async fn sequential_submissions_increase() {
        let store = MockStore::default();
        let coordinator = coordinator(&store);
        let mut previous = 0;
        for _ in 0..5 {
            let kot_no = coordinator.submit(request(vec![item(1, 10, 10)])).await.unwrap();
            assert!(kot_no > previous);
            previous = kot_no;
        }
        assert_eq!(previous, 5);
    }

    #[tokio::test]
    async fn missing_amounts_default_to_zero() {
        let store = MockStore::default();
        let bare = KotItemRequest {
            code: Some("X".to_string()),
            ..KotItemRequest::default()
        };
        coordinator(&store).submit(request(vec![bare])).await.unwrap();
        let state = store.state();
        assert_eq!(state.lines[0].quantity, 0);
        assert_eq!(state.lines[0].line_total, Decimal::ZERO);
        assert_eq!(state.lines[0].description, "");
        assert_eq!(state.summaries[0].gross_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn empty_items_open_no_transaction() {
        let store = MockStore::with_counter(41);
        let err = coordinator(&store).submit(request(vec![])).await.unwrap_err();
        assert!(matches!(err, KotError::Validation { .. }));

        let state = store.state();
        assert_eq!(state.begun, 0);
        assert_eq!(state.counter, 41);
        assert!(state.lines.is_empty() && state.summaries.is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_the_store() {
        let store = MockStore::default();
        let coordinator = coordinator(&store);
        let broken: [fn(&mut SubmitKotRequest); 8] = [
            |r| r.menu_section = None,
            |r| r.order_type = Some("  ".to_string()),
            |r| r.table_id = Some(String::new()),
            |r| r.items = None,
            |r| r.user_id = None,
            |r| r.user_id = Some(0),
            |r| r.items = Some(vec![item(-1, 10, 10)]),
            |r| r.items = Some(vec![item(1, -10, 10)]),
        ];
        for breaker in broken {
            let mut req = request(vec![item(1, 10, 10)]);
            breaker(&mut req);
            let err = coordinator.submit(req).await.unwrap_err();
            assert!(matches!(err, KotError::Validation { .. }), "unexpected {err:?}");
        }
        assert_eq!(store.state().begun, 0);
    }

    #[tokio::test]
    async fn failed_summary_rolls_back_the_lines() {
        let store = MockStore::with_counter(10);
        store.state().fail_summary = true;
        let err = coordinator(&store)
            .submit(request(vec![item(1, 10, 10), item(2, 5, 10)]))
            .await
            .unwrap_err();
        assert!(matches!(err, KotError::Store { source: StoreError::Query { .. } }));

        let state = store.state();
        assert_eq!(state.rollbacks, 1);
        assert!(state.lines.is_empty() && state.summaries.is_empty());
        assert_eq!(state.counter, 10);
    }

    #[tokio::test]
    async fn failed_line_rolls_back_everything() {
        let store = MockStore::default();
        store.state().fail_line_at = Some(1);
        assert!(coordinator(&store)
            .submit(request(vec![item(1, 10, 10), item(1, 20, 20), item(1, 30, 30)]))
            .await
            .is_err());
        let state = store.state();
        assert!(state.lines.is_empty() && state.summaries.is_empty());
        assert_eq!(state.commits, 0);
    }

    #[tokio::test]
    async fn unavailable_store_surfaces_as_store_failure() {
        let store = MockStore::default();
        store.state().unavailable = true;
        let err = coordinator(&store).submit(request(vec![item(1, 1, 1)])).await.unwrap_err();
        assert!(matches!(err, KotError::Store { source: StoreError::Unavailable { .. } }));
    }

    #[tokio::test]
    async fn concurrent_pair_gets_distinct_numbers() {
        let store = MockStore::with_counter(41);
        let coordinator = coordinator(&store);
        let (a, b) = tokio::join!(
            coordinator.submit(request(vec![item(1, 10, 10)])),
            coordinator.submit(request(vec![item(1, 20, 20)])),
        );
        let got: HashSet<_> = [a.unwrap(), b.unwrap()].into_iter().collect();
        assert_eq!(got, HashSet::from([42, 43]));
    }

    #[tokio::test]
    async fn many_concurrent_submissions_never_share_a_number() {
        const N: usize = 16;
        let store = MockStore::default();
        let coordinator = coordinator(&store);
        let results = join_all((0..N).map(|_| coordinator.submit(request(vec![item(1, 10, 10)])))).await;
        let numbers = results.into_iter().map(Result::unwrap).collect::<HashSet<_>>();
        assert_eq!(numbers.len(), N);

        let state = store.state();
        assert_eq!(state.summaries.len(), N);
        let committed = state.summaries.iter().map(|s| s.kot_no).collect::<HashSet<_>>();
        assert_eq!(committed, numbers);
    }

    #[tokio::test]
    async fn conflict_is_retried_with_a_new_transaction() {
        let store = MockStore::with_counter(5);
        store.state().conflicts = 1;
        let kot_no = coordinator(&store).submit(request(vec![item(1, 10, 10)])).await.unwrap();
        assert_eq!(kot_no, 6);
        let state = store.state();
        assert_eq!(state.begun, 2);
        assert_eq!(state.summaries.len(), 1);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let store = MockStore::default();
        store.state().conflicts = 10;
        let err = coordinator(&store).submit(request(vec![item(1, 10, 10)])).await.unwrap_err();
        assert!(matches!(err, KotError::Store { source: StoreError::Conflict { .. } }));
        let state = store.state();
        assert_eq!(state.begun, KotSettings::default().max_submit_attempts as usize);
        assert!(state.lines.is_empty());
    }

    #[tokio::test]
    async fn timeout_leaves_no_partial_ticket() {
        let store = MockStore::default();
        store.state().stall = Some(Duration::from_millis(30));
        let settings = KotSettings {
            submit_timeout: Duration::from_millis(50),
            ..KotSettings::default()
        };
        let err = OrderCoordinator::new(store.clone(), settings)
            .submit(request(vec![item(1, 1, 1), item(1, 2, 2), item(1, 3, 3)]))
            .await
            .unwrap_err();
        assert!(matches!(err, KotError::Store { source: StoreError::Timeout }));
        let state = store.state();
        assert!(state.lines.is_empty() && state.summaries.is_empty());
        assert_eq!(state.counter, 0);
    }

    fn cents(total: &str) -> KotItemRequest {
        KotItemRequest {
            quantity: Some(1),
            line_total: Some(total.parse().unwrap()),
            ..KotItemRequest::default()
        }
    }

    #[tokio::test]
    async fn fractional_amounts_are_rounded_to_cents_before_summing() {
        let store = MockStore::default();
        coordinator(&store)
            .submit(request(vec![cents("0.005"), cents("0.005"), cents("12.344"), cents("0.1")]))
            .await
            .unwrap();

        let state = store.state();
        let stored = state.lines.iter().map(|l| l.line_total).collect::<Vec<_>>();
        assert_eq!(stored, ["0.01", "0.01", "12.34", "0.10"].map(|v| v.parse::<Decimal>().unwrap()));
        assert!(state.lines.iter().all(|l| l.line_total.scale() <= 2));
        let sum: Decimal = stored.iter().sum();
        assert_eq!(state.summaries[0].gross_amount, sum);
        assert_eq!(sum, "12.46".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn amounts_beyond_the_columns_are_validation_errors() {
        let store = MockStore::default();
        let coordinator = coordinator(&store);

        let err = coordinator.submit(request(vec![cents("100000000")])).await.unwrap_err();
        assert!(matches!(err, KotError::Validation { .. }), "unexpected {err:?}");

        let mut pricey = cents("1");
        pricey.unit_price = Some("99999999.995".parse().unwrap());
        let err = coordinator.submit(request(vec![pricey])).await.unwrap_err();
        assert!(matches!(err, KotError::Validation { .. }), "unexpected {err:?}");

        let many = (0..101).map(|_| cents("99999999.99")).collect();
        let err = coordinator.submit(request(many)).await.unwrap_err();
        assert!(matches!(err, KotError::Validation { .. }), "unexpected {err:?}");

        assert_eq!(store.state().begun, 0);
        coordinator.submit(request(vec![cents("99999999.99")])).await.unwrap();
    }
}
