pub mod config;
pub mod error;
pub mod round_builder;
pub mod scoreboard;
pub mod server;
pub mod server_state;
pub mod store;

mod handlers;
mod http_types;
