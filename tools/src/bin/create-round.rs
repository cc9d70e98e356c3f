use anyhow::anyhow;
use clap::Parser;

use mtt_engine::model::MatchType;
use mtt_server::config::RoundConfig;
use mtt_server::round_builder::{self, RoundLocks};
use mtt_server::store;

#[derive(Parser, Debug)]
struct Config {
    #[arg(long)]
    db: String,
    // The latest tournament when omitted.
    #[arg(long)]
    tournament_id: Option<i64>,
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_module("sqlx", log::LevelFilter::Error)
        .init();
    let cfg = Config::parse();
    let db = sea_orm::Database::connect(&cfg.db).await?;
    let tournament_id = match cfg.tournament_id {
        Some(id) => id,
        None => store::latest_tournament(&db)
            .await?
            .ok_or_else(|| anyhow!("There are no tournaments"))?,
    };
    let round_config = RoundConfig {
        pairing_timeout: None,
        seed: cfg.seed,
    };
    let round = round_builder::create_round(
        &db,
        &RoundLocks::new(),
        tournament_id,
        &round_config,
        round_builder::rng(&round_config),
    )
    .await?;
    println!("Round {} of tournament {tournament_id}", round.number);
    for m in round.matches.iter() {
        match m.match_type {
            MatchType::Bye => println!("  bye: team {}", m.teams[0]),
            MatchType::Normal => println!(
                "  match {}: teams {} and {} at table {}",
                m.id,
                m.teams[0],
                m.teams[1],
                m.table_id.map_or("-".to_owned(), |t| t.to_string())
            ),
        }
    }
    if !round.success {
        println!("Unpaired teams: {:?}", round.unpaired);
    }
    Ok(())
}
