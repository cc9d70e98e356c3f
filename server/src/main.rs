use anyhow::{anyhow, Context};

use mtt_server::config::{self, Config};
use mtt_server::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_module("sqlx", log::LevelFilter::Error)
        .init();
    let args: Vec<String> = std::env::args().collect();
    let config: Config = if args.len() > 1 {
        let config = tokio::fs::read_to_string(&args[1])
            .await
            .context(format!("Failed to read config file {}", args[1]))?;
        if let Some(f) = args.get(2) {
            return Err(anyhow!("Unrecognized flag: {f}"));
        }
        let config = toml::from_str(&config).context("Failed to parse config")?;
        config::validate(&config).map_err(|e| anyhow!("Config validation failed: {e}"))?;
        config
    } else {
        return Err(anyhow::Error::msg(
            "config file must be specified as the first arg",
        ));
    };
    server::run(config).await
}
