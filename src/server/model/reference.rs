use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MenuItem {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct MenuItemsResponse {
    pub success: bool,
    pub data: Vec<MenuItem>,
}
