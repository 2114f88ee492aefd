use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::server::model::kot::ValidatedOrder;
use crate::server::model::TicketNumber;

/// Business fields of the sales summary that are not derived from the order.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDefaults {
    pub client_id: String,
    pub table_code: String,
    pub sale_type: String,
    pub covers: i32,
    pub captain_id: String,
    pub exchange_amount: Decimal,
    pub roundoff_amount: Decimal,
    pub overall_discount: Decimal,
    pub bill_printed: i32,
    pub company_code: i32,
    pub system_number: String,
    pub employee_code: String,
    pub cash_received: Decimal,
    pub customer_code: i32,
    pub tax_amount: Decimal,
    pub service_tax_amount: Decimal,
    pub remarks: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub token_no: String,
}

impl Default for SummaryDefaults {
    fn default() -> Self {
        Self {
            client_id: "CL1".to_string(),
            table_code: String::new(),
            sale_type: "1".to_string(),
            covers: 1,
            captain_id: "1".to_string(),
            exchange_amount: Decimal::from(48),
            roundoff_amount: Decimal::from(48),
            overall_discount: Decimal::ZERO,
            bill_printed: 48,
            company_code: 1,
            system_number: "S1".to_string(),
            employee_code: "1".to_string(),
            cash_received: Decimal::ZERO,
            customer_code: 1,
            tax_amount: Decimal::ZERO,
            service_tax_amount: Decimal::from(48),
            remarks: "OK".to_string(),
            customer_name: String::new(),
            customer_phone: String::new(),
            token_no: "D".to_string(),
        }
    }
}

/// One aggregated sales record per ticket, written once at submission.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderSummary {
    pub kot_no: TicketNumber,
    pub client_id: String,
    pub table_code: String,
    pub sale_date: DateTime<Utc>,
    pub sale_type: String,
    pub sale_table_no: String,
    pub covers: i32,
    pub captain_id: String,
    pub gross_amount: Decimal,
    pub exchange_amount: Decimal,
    pub roundoff_amount: Decimal,
    pub overall_discount: Decimal,
    pub nett_amount: Decimal,
    pub received_amount: Decimal,
    pub bill_cancelled: bool,
    pub company_code: i32,
    pub bill_printed: i32,
    pub system_number: String,
    pub employee_code: String,
    pub cash_received: Decimal,
    pub customer_code: i32,
    pub due_date: DateTime<Utc>,
    pub base_amount: Decimal,
    pub tax_amount: Decimal,
    pub service_tax_amount: Decimal,
    pub remarks: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub token_no: String,
}

impl OrderSummary {
    /// Build the summary of `order` committed under `kot_no`.
    /// `gross` is the sum of the line totals actually written.
    pub fn new(
        kot_no: TicketNumber,
        order: &ValidatedOrder,
        gross: Decimal,
        sale_date: DateTime<Utc>,
        defaults: &SummaryDefaults,
    ) -> Self {
        let nett = gross - defaults.overall_discount;
        Self {
            kot_no,
            client_id: defaults.client_id.clone(),
            table_code: defaults.table_code.clone(),
            sale_date,
            sale_type: defaults.sale_type.clone(),
            sale_table_no: order.header.table_id.clone(),
            covers: defaults.covers,
            captain_id: defaults.captain_id.clone(),
            gross_amount: gross,
            exchange_amount: defaults.exchange_amount,
            roundoff_amount: defaults.roundoff_amount,
            overall_discount: defaults.overall_discount,
            nett_amount: nett,
            received_amount: nett,
            bill_cancelled: false,
            company_code: defaults.company_code,
            bill_printed: defaults.bill_printed,
            system_number: defaults.system_number.clone(),
            employee_code: defaults.employee_code.clone(),
            cash_received: defaults.cash_received,
            customer_code: defaults.customer_code,
            due_date: sale_date,
            base_amount: gross,
            tax_amount: defaults.tax_amount,
            service_tax_amount: defaults.service_tax_amount,
            remarks: defaults.remarks.clone(),
            customer_name: defaults.customer_name.clone(),
            customer_phone: defaults.customer_phone.clone(),
            token_no: defaults.token_no.clone(),
        }
    }
}
