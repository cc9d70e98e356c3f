use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sea_orm::Database;

use crate::config::*;
use crate::handlers::*;
use crate::server_state::*;

pub struct Handle {
    pub server: actix_web::dev::Server,
    pub addrs: Vec<std::net::SocketAddr>,
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let handle = create(config).await?;
    log::info!("Listening on {:?}", handle.addrs);
    handle.server.await?;
    Ok(())
}

/// Registers all endpoints; the app must carry a [`ServerState`].
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(post_create_round::post_create_round)
        .service(get_scoreboard::get_scoreboard);
}

pub async fn create(config: Config) -> anyhow::Result<Handle> {
    let mut db_options = sea_orm::ConnectOptions::new(&config.db_path);
    db_options.max_connections(32);
    let db = Database::connect(db_options)
        .await
        .context(format!("Failed to connect to {}", config.db_path))?;
    let app_state = ServerState::new(db, config.round_config);
    let server_config = config.server_config;
    let server = HttpServer::new(move || App::new().app_data(app_state.clone()).configure(routes))
        .workers(4)
        .bind((server_config.bind_address.as_str(), server_config.port))
        .context(format!(
            "Failed to bind to {}:{}",
            server_config.bind_address, server_config.port
        ))?;
    let addrs = server.addrs();
    let server = server.run(); // Does not actually run the server but creates a future.
    Ok(Handle { server, addrs })
}
