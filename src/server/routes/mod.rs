//! HTTP surface of the service.

use actix_web::web;
use crate::server::controller::error::CustomError;
use crate::server::controller::{kot, login, reference};
use crate::server::database::store::KotStore;

/// Register every route backed by the store `S`.
pub(crate) fn configure<S: KotStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| CustomError::bad_request(err).into()))
        .app_data(web::QueryConfig::default().error_handler(|err, _| CustomError::bad_request(err).into()))
        .app_data(web::PathConfig::default().error_handler(|err, _| CustomError::bad_request(err).into()))
        .service(web::resource("/v1/login").route(web::post().to(login::post_login::<S>)))
        .service(
            web::resource("/v1/kots")
                .route(web::post().to(kot::post_kots::<S>))
                .route(web::get().to(kot::get_kots::<S>)),
        )
        // literal segments before `{kot_no}`
        .service(web::resource("/v1/kot/cancel").route(web::put().to(kot::put_cancel::<S>)))
        .service(web::resource("/v1/kot/print").route(web::post().to(kot::post_print::<S>)))
        .service(web::resource("/v1/kot/{kot_no}").route(web::get().to(kot::get_kot::<S>)))
        .service(web::resource("/v1/kot/{kot_no}/print").route(web::get().to(kot::get_print::<S>)))
        .service(web::resource("/v1/menu/sections").route(web::get().to(reference::get_menu_sections::<S>)))
        .service(
            web::resource("/v1/menu/sections/{section}/items")
                .route(web::get().to(reference::get_menu_items::<S>)),
        )
        .service(web::resource("/v1/order-types").route(web::get().to(reference::get_order_types::<S>)))
        .service(web::resource("/v1/tables").route(web::get().to(reference::get_tables::<S>)));
}
