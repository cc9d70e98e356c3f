use std::sync::Arc;

use actix_web::HttpRequest;
use sea_orm::DatabaseConnection;

use crate::http_types::*;
use crate::round_builder::RoundLocks;

#[derive(Clone)]
pub struct ServerState {
    pub round_config: crate::config::RoundConfig,
    pub db: DatabaseConnection,
    pub locks: Arc<RoundLocks>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, round_config: crate::config::RoundConfig) -> Self {
        ServerState {
            round_config,
            db,
            locks: Arc::new(RoundLocks::new()),
        }
    }
}

pub fn server_state(req: &HttpRequest) -> Result<&ServerState, AppHttpError> {
    req.app_data::<ServerState>().ok_or_else(move || {
        log::error!("Server state is not there");
        AppHttpError::Internal
    })
}
