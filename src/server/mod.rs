//! main file for the server

pub mod auth;
pub(crate) mod controller;
pub mod database;
pub(crate) mod kot;
pub mod model;
mod routes;
pub(crate) mod state;
pub(crate) mod util;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use crate::server::database::gateway::StoreGateway;
use crate::server::database::pg::{PgConnector, PgStore};
use crate::server::model::config::ServerConfig;
use crate::server::state::AppState;

/// Run the server until it is stopped, then close the store gateway.
pub async fn run(ServerConfig { addr, workers, pool, kot }: ServerConfig) -> std::io::Result<()> {
    let gateway = StoreGateway::new(PgConnector::new(pool.conn_str.as_str()), &pool);
    let state = web::Data::new(AppState::new(
        PgStore::new(gateway.clone(), pool.statement_timeout),
        &kot,
    ));
    info!(
        "serving on {} with {} workers, pool {} of size {}",
        addr, workers, pool.name, pool.size
    );
    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::configure::<PgStore>)
    })
    .workers(workers)
    .bind(addr)?
    .run()
    .await;
    gateway.close();
    result
}
