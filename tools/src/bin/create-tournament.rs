use anyhow::{anyhow, Context};
use clap::Parser;
use rust_decimal::Decimal;
use sea_orm::prelude::TimeDateTimeWithTimeZone;
use sea_orm::{EntityTrait, Set};

use mtt_db as db;
use mtt_server::store;

#[derive(Parser, Debug)]
struct Config {
    #[arg(long)]
    db: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "3.0")]
    bye_score: Decimal,
    // Player scoreboard length; all players when omitted.
    #[arg(long)]
    shown_players: Option<i32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    if cfg.bye_score.is_sign_negative() {
        return Err(anyhow!("--bye-score must not be negative"));
    }
    let db = sea_orm::Database::connect(&cfg.db).await?;
    let tournament = db::tournaments::ActiveModel {
        name: Set(cfg.name.clone()),
        creation_time: Set(TimeDateTimeWithTimeZone::now_utc()),
        bye_score: Set(store::score_to_db(cfg.bye_score)?),
        default_round_visibility: Set(db::common::Visibility::Show),
        shown_players: Set(cfg.shown_players),
        ..Default::default()
    };
    let id = db::prelude::Tournaments::insert(tournament)
        .exec(&db)
        .await
        .context(format!("Failed to create tournament {:?}", cfg.name))?
        .last_insert_id;
    println!("Tournament {id}: {}", cfg.name);
    Ok(())
}
