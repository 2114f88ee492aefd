use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::server::model::{LineId, TicketNumber, UserId};

/// Body of an order submission. Every field is optional on the wire so that
/// absent values surface as validation errors instead of extractor failures.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitKotRequest {
    pub menu_section: Option<String>,
    #[serde(alias = "radioOption")]
    pub order_type: Option<String>,
    #[serde(alias = "selectedRoom")]
    pub table_id: Option<String>,
    pub items: Option<Vec<KotItemRequest>>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KotItemRequest {
    pub code: Option<String>,
    #[serde(alias = "desc")]
    pub description: Option<String>,
    #[serde(alias = "qty")]
    pub quantity: Option<i32>,
    #[serde(alias = "price")]
    pub unit_price: Option<Decimal>,
    #[serde(alias = "total")]
    pub line_total: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Fields shared by every line of one ticket.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderHeader {
    pub menu_section: String,
    pub order_type: String,
    pub table_id: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderItem {
    pub code: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub remarks: String,
}

/// A submission that passed validation, ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedOrder {
    pub header: OrderHeader,
    pub items: Vec<OrderItem>,
}

/// One row about to be inserted inside a submission transaction.
#[derive(Debug)]
pub(crate) struct NewKotLine<'a> {
    pub kot_no: TicketNumber,
    pub created_at: DateTime<Utc>,
    pub header: &'a OrderHeader,
    pub item: &'a OrderItem,
}

/// A persisted order line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KotLine {
    pub id: LineId,
    pub kot_no: TicketNumber,
    pub created_at: DateTime<Utc>,
    pub menu_section: String,
    pub order_type: String,
    pub table_id: String,
    pub item_code: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub remarks: String,
    pub cancelled: bool,
    pub user_id: UserId,
}

/// Which lines of a ticket a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineScope {
    /// audit view, cancelled lines included
    All,
    /// kitchen view
    Active,
}

/// Lines of one ticket as sent to the kitchen printer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PrintView {
    pub kot_no: TicketNumber,
    pub items: Vec<KotLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitKotResponse {
    pub success: bool,
    pub kot_no: TicketNumber,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelLineRequest {
    pub id: Option<LineId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelLineResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KotListParams {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KotListResponse {
    pub success: bool,
    pub data: Vec<TicketNumber>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KotDetailResponse {
    pub success: bool,
    pub data: Vec<KotLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrintByUserRequest {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrintKotResponse {
    pub success: bool,
    pub kot_no: TicketNumber,
    pub items: Vec<KotLine>,
}

impl From<PrintView> for PrintKotResponse {
    fn from(PrintView { kot_no, items }: PrintView) -> Self {
        Self {
            success: true,
            kot_no,
            items,
        }
    }
}
