use actix_web::{web, Responder};
use crate::server::controller::error::CustomError;
use crate::server::database::store::KotStore;
use crate::server::model::reference::MenuItemsResponse;
use crate::server::state::AppState;

/// GET /v1/menu/sections
pub(crate) async fn get_menu_sections<S: KotStore>(data: web::Data<AppState<S>>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(data.store().menu_sections().await?))
}

/// GET /v1/menu/sections/{section}/items
pub(crate) async fn get_menu_items<S: KotStore>(
    section: web::Path<String>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let section = section.into_inner();
    if section.trim().is_empty() {
        return Err(CustomError::bad_request("menu section is required"));
    }
    let items = data.store().menu_items(&section).await?;
    Ok(web::Json(MenuItemsResponse {
        success: true,
        data: items,
    }))
}

/// GET /v1/order-types
pub(crate) async fn get_order_types<S: KotStore>(data: web::Data<AppState<S>>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(data.store().order_types().await?))
}

/// GET /v1/tables
pub(crate) async fn get_tables<S: KotStore>(data: web::Data<AppState<S>>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(data.store().table_names().await?))
}
