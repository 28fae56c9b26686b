mod config;
mod context;
mod db;
mod error;
mod services;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    let url = config.url();
    let max_form_bytes = config.max_form_bytes;
    let bind_addr = (config.host.clone(), config.port);

    if config.access_password.is_none() {
        warn!("BACKCHECK_PASSWORD is not set; the API is open to anyone who can reach it");
    }

    let state = AppState::new(config);
    let version = state.db.migrate().map_err(io::Error::other)?;
    info!(
        "Database {} at schema v{}",
        state.db.path().display(),
        version
    );

    info!("Server running at {}", url);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(max_form_bytes))
            .app_data(state.clone())
            .service(services::form::configure_routes())
            .service(services::back_checks::configure_routes())
            .service(services::export::configure_routes())
    })
    .bind(bind_addr)?
    .run()
    .await
}
