use std::time::Duration;
use chrono::NaiveDate;
use log::{error, warn};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};
use crate::server::database::gateway::{Connection, Connector, StoreGateway};
use crate::server::database::store::{KotStore, KotTransaction, StoreError};
use crate::server::kot::allocator::{TicketAllocator, ALLOCATE_TICKET_SQL};
use crate::server::model::identity::StoredCredential;
use crate::server::model::kot::{KotLine, LineScope, NewKotLine};
use crate::server::model::reference::MenuItem;
use crate::server::model::summary::OrderSummary;
use crate::server::model::{LineId, TicketNumber, UserId};

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        let reason = error_reason(&e);
        if e.is_closed() {
            return StoreError::Unavailable { reason };
        }
        match e.code() {
            Some(code)
                if *code == SqlState::UNIQUE_VIOLATION
                    || *code == SqlState::T_R_SERIALIZATION_FAILURE
                    || *code == SqlState::T_R_DEADLOCK_DETECTED =>
            {
                StoreError::Conflict { reason }
            }
            Some(code) if *code == SqlState::QUERY_CANCELED => StoreError::Timeout,
            Some(code) if code.code().starts_with("08") => StoreError::Unavailable { reason },
            _ => StoreError::Query { reason },
        }
    }
}

/// Server side message and SQLSTATE when the server answered, since the
/// `Display` of a server error is only "db error".
fn error_reason(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{} ({}): {}", db.message(), db.code().code(), detail),
            None => format!("{} ({})", db.message(), db.code().code()),
        },
        None => e.to_string(),
    }
}

pub(crate) struct PgConnector {
    conn_str: String,
}

impl PgConnector {
    pub fn new(conn_str: impl Into<String>) -> Self {
        Self {
            conn_str: conn_str.into(),
        }
    }
}

impl Connector for PgConnector {
    type Client = Client;

    async fn connect(&self) -> Result<Client, StoreError> {
        let (client, conn) = tokio_postgres::connect(&self.conn_str, NoTls)
            .await
            .map_err(|e| {
                error!("failed to create connection, {}", e);
                StoreError::Unavailable { reason: e.to_string() }
            })?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }

    fn is_closed(client: &Client) -> bool {
        client.is_closed()
    }
}

const LINE_COLUMNS: &str = r#"
    id, kot_no, created_at, menu_section, order_type, table_id, item_code,
    description, quantity, unit_price, line_total, remarks, cancelled, user_id
"#;

fn line_from_row(row: &Row) -> Result<KotLine, tokio_postgres::Error> {
    Ok(KotLine {
        id: row.try_get("id")?,
        kot_no: row.try_get("kot_no")?,
        created_at: row.try_get("created_at")?,
        menu_section: row.try_get("menu_section")?,
        order_type: row.try_get("order_type")?,
        table_id: row.try_get("table_id")?,
        item_code: row.try_get("item_code")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        line_total: row.try_get("line_total")?,
        remarks: row.try_get("remarks")?,
        cancelled: row.try_get("cancelled")?,
        user_id: row.try_get("user_id")?,
    })
}

fn strings_from_rows(rows: &[Row], column: &str) -> Result<Vec<String>, StoreError> {
    rows.iter()
        .map(|r| r.try_get::<_, String>(column))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}

/// PostgreSQL backed store.
#[derive(Clone)]
pub(crate) struct PgStore {
    gateway: StoreGateway<PgConnector>,
    statement_timeout: Duration,
}

impl PgStore {
    pub fn new(gateway: StoreGateway<PgConnector>, statement_timeout: Duration) -> Self {
        Self {
            gateway,
            statement_timeout,
        }
    }
}

impl KotStore for PgStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, StoreError> {
        let mut conn = self.gateway.acquire().await?;
        let stmt = format!(
            "BEGIN ISOLATION LEVEL READ COMMITTED; SET LOCAL statement_timeout = {};",
            self.statement_timeout.as_millis()
        );
        if let Err(e) = conn.batch_execute(&stmt).await {
            conn.discard();
            return Err(e.into());
        }
        Ok(PgTransaction { conn, finished: false })
    }

    async fn cancel_line(&self, id: LineId) -> Result<u64, StoreError> {
        let conn = self.gateway.acquire().await?;
        Ok(conn
            .execute("UPDATE kot_line SET cancelled = TRUE WHERE id = $1", &[&id])
            .await?)
    }

    async fn ticket_numbers_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TicketNumber>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let rows = conn
            .query(
                r#"
                SELECT DISTINCT kot_no
                FROM kot_line
                WHERE created_at::date BETWEEN $1 AND $2
                ORDER BY kot_no DESC
            "#,
                &[&from, &to],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| r.try_get("kot_no"))
            .collect::<Result<Vec<TicketNumber>, _>>()?)
    }

    async fn ticket_lines(&self, kot_no: TicketNumber, scope: LineScope) -> Result<Vec<KotLine>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let filter = match scope {
            LineScope::All => "",
            LineScope::Active => "AND NOT cancelled",
        };
        let stmt = format!("SELECT {LINE_COLUMNS} FROM kot_line WHERE kot_no = $1 {filter} ORDER BY id");
        let rows = conn.query(stmt.as_str(), &[&kot_no]).await?;
        Ok(rows
            .iter()
            .map(line_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn latest_ticket_for_user(&self, user_id: UserId) -> Result<Option<TicketNumber>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let row = conn
            .query_opt(
                r#"
                SELECT kot_no
                FROM kot_line
                WHERE user_id = $1
                ORDER BY created_at DESC, kot_no DESC
                LIMIT 1
            "#,
                &[&user_id],
            )
            .await?;
        Ok(row.map(|r| r.try_get::<_, TicketNumber>("kot_no")).transpose()?)
    }

    async fn find_credential(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let row = conn
            .query_opt(
                "SELECT id, username, password_salt, password_hash FROM login WHERE username = $1",
                &[&username],
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(StoredCredential {
            user_id: row.try_get("id")?,
            username: row.try_get("username")?,
            salt: row.try_get("password_salt")?,
            hash: row.try_get("password_hash")?,
        }))
    }

    async fn menu_sections(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let rows = conn
            .query("SELECT DISTINCT section FROM menu_item ORDER BY section", &[])
            .await?;
        strings_from_rows(&rows, "section")
    }

    async fn menu_items(&self, section: &str) -> Result<Vec<MenuItem>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let rows = conn
            .query(
                "SELECT id, name, price FROM menu_item WHERE section = $1 ORDER BY id",
                &[&section],
            )
            .await?;
        rows.iter()
            .map(|r| -> Result<MenuItem, StoreError> {
                Ok(MenuItem {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                    price: r.try_get("price")?,
                })
            })
            .collect()
    }

    async fn order_types(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let rows = conn
            .query("SELECT label FROM order_type_option ORDER BY id", &[])
            .await?;
        strings_from_rows(&rows, "label")
    }

    async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.gateway.acquire().await?;
        let rows = conn
            .query("SELECT name FROM table_master ORDER BY id", &[])
            .await?;
        strings_from_rows(&rows, "name")
    }
}

/// A submission transaction pinned to one pooled connection. If it is dropped
/// before commit or rollback, the connection is discarded and the server
/// aborts the transaction when the socket closes.
pub(crate) struct PgTransaction {
    conn: Connection<PgConnector>,
    finished: bool,
}

impl PgTransaction {
    async fn finish(&mut self, stmt: &str) -> Result<(), tokio_postgres::Error> {
        self.finished = true;
        let result = self.conn.batch_execute(stmt).await;
        if result.is_err() {
            self.conn.discard();
        }
        result
    }
}

impl TicketAllocator for PgTransaction {
    async fn next_ticket_number(&mut self) -> Result<TicketNumber, StoreError> {
        let row = self.conn.query_one(ALLOCATE_TICKET_SQL, &[]).await?;
        Ok(row.try_get("last_value")?)
    }
}

impl KotTransaction for PgTransaction {
    async fn insert_line(&mut self, line: &NewKotLine<'_>) -> Result<(), StoreError> {
        let (header, item) = (line.header, line.item);
        self.conn
            .execute(
                r#"
                INSERT INTO kot_line(
                    kot_no, created_at, menu_section, order_type, table_id, item_code,
                    description, quantity, unit_price, line_total, remarks, user_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
                &[
                    &line.kot_no,
                    &line.created_at,
                    &header.menu_section,
                    &header.order_type,
                    &header.table_id,
                    &item.code,
                    &item.description,
                    &item.quantity,
                    &item.unit_price,
                    &item.line_total,
                    &item.remarks,
                    &header.user_id,
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_summary(&mut self, s: &OrderSummary) -> Result<(), StoreError> {
        self.conn
            .execute(
                r#"
                INSERT INTO order_summary(
                    kot_no, client_id, table_code, sale_date, sale_type, sale_table_no,
                    sale_table_covers, sale_captain_id, sale_amount_gross, sale_amount_exchange,
                    sale_amount_roundoff, sale_overall_discount, sale_amount_nett,
                    sale_amount_received, sale_bill_cancelled, company_code, bill_printed,
                    system_number, employee_code, cash_received, customer_code, due_date,
                    total_sale_base_amount, total_sale_tax_amount, service_tax_amount, remarks,
                    sale_customer_name, customer_cell_phone, token_no
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
                )
            "#,
                &[
                    &s.kot_no,
                    &s.client_id,
                    &s.table_code,
                    &s.sale_date,
                    &s.sale_type,
                    &s.sale_table_no,
                    &s.covers,
                    &s.captain_id,
                    &s.gross_amount,
                    &s.exchange_amount,
                    &s.roundoff_amount,
                    &s.overall_discount,
                    &s.nett_amount,
                    &s.received_amount,
                    &s.bill_cancelled,
                    &s.company_code,
                    &s.bill_printed,
                    &s.system_number,
                    &s.employee_code,
                    &s.cash_received,
                    &s.customer_code,
                    &s.due_date,
                    &s.base_amount,
                    &s.tax_amount,
                    &s.service_tax_amount,
                    &s.remarks,
                    &s.customer_name,
                    &s.customer_phone,
                    &s.token_no,
                ],
            )
            .await?;
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        Ok(self.finish("COMMIT").await?)
    }

    async fn rollback(mut self) {
        if let Err(e) = self.finish("ROLLBACK").await {
            warn!("rollback failed, connection discarded, {}", e);
        }
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        if !self.finished {
            warn!("transaction abandoned before commit, discarding its connection");
            self.conn.discard();
        }
    }
}
