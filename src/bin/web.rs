//! Single binary web server exposing the bracket engine as a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, PAIRING_POLICY (bracket_position | redraw), ROUND_INTERVAL_DAYS.

use actix_web::{web::Data, App, HttpServer};
use std::sync::Arc;
use tennis_bracket::{api, BracketEngine, MemoryStore, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!(
        "Pairing policy {:?}, {} day(s) between rounds",
        config.engine.pairing,
        config.engine.round_interval_days
    );

    let engine = Data::new(BracketEngine::new(Arc::new(MemoryStore::new()), config.engine));

    HttpServer::new(move || App::new().app_data(engine.clone()).configure(api::configure))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
