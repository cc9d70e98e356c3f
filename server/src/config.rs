use serde::{Deserialize, Serialize};

fn default_bind_address() -> String {
    "::".to_owned()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RoundConfig {
    // Planning runs on a blocking thread and is abandoned after this long.
    #[serde(default)]
    pub pairing_timeout: Option<std::time::Duration>,
    // Fixes the first round shuffle; entropy otherwise.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server_config: ServerConfig,
    #[serde(default)]
    pub round_config: RoundConfig,
    pub db_path: String,
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.round_config.pairing_timeout == Some(std::time::Duration::ZERO) {
        return Err("round_config.pairing_timeout must be positive".to_owned());
    }
    if cfg.db_path.is_empty() {
        return Err("db_path must not be empty".to_owned());
    }
    Ok(())
}
