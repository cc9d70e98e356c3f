use anyhow::{anyhow, Context};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::{EntityTrait, Set, TransactionTrait};

use mtt_db as db;

const TEAM_NAMES: [&str; 14] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi",
];

const TABLE_NAMES: [&str; 10] = [
    "Abstract", "European", "African", "Asian", "Finish", "Connection", "Chess", "Draughts",
    "Atypical", "Classic",
];

/// Replaces all teams, players and tables with random ones.
#[derive(Parser, Debug)]
struct Config {
    #[arg(long)]
    db: String,
    num_teams: usize,
    // Per team.
    num_players: usize,
    num_tables: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    if cfg.num_teams > TEAM_NAMES.len() {
        return Err(anyhow!("At most {} teams are supported", TEAM_NAMES.len()));
    }
    if cfg.num_tables > TABLE_NAMES.len() {
        return Err(anyhow!("At most {} tables are supported", TABLE_NAMES.len()));
    }
    let db = sea_orm::Database::connect(&cfg.db).await?;
    let mut rng = rand::thread_rng();
    let team_names = TEAM_NAMES
        .choose_multiple(&mut rng, cfg.num_teams)
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    let table_names = TABLE_NAMES
        .choose_multiple(&mut rng, cfg.num_tables)
        .copied()
        .collect::<Vec<_>>();
    let tables = table_names
        .into_iter()
        .map(|s| (s.to_string(), rng.gen_range(0..=100)))
        .collect::<Vec<(String, i32)>>();
    let num_players = cfg.num_players;

    db.transaction(|txn| {
        Box::pin(async move {
            db::prelude::Teams::delete_many().exec(txn).await?;
            db::prelude::Tables::delete_many().exec(txn).await?;
            for name in team_names {
                let team = db::teams::ActiveModel {
                    name: Set(name.clone()),
                    active: Set(true),
                    ..Default::default()
                };
                let team_id = db::prelude::Teams::insert(team)
                    .exec(txn)
                    .await?
                    .last_insert_id;
                let players = (0..num_players)
                    .map(|i| format!("{name} player {}", i + 1))
                    .collect::<Vec<_>>();
                for (i, player) in players.iter().enumerate() {
                    let p = db::players::ActiveModel {
                        name: Set(player.clone()),
                        team_id: Set(Some(team_id)),
                        is_captain: Set(i == 0),
                        ..Default::default()
                    };
                    db::prelude::Players::insert(p).exec(txn).await?;
                }
                println!("Team {team_id} {name}: {players:?}");
            }
            for (name, priority) in tables {
                let table = db::tables::ActiveModel {
                    name: Set(name.clone()),
                    description: Set(None),
                    priority: Set(priority),
                    ..Default::default()
                };
                let id = db::prelude::Tables::insert(table)
                    .exec(txn)
                    .await?
                    .last_insert_id;
                println!("Table {id} {name}: priority {priority}");
            }
            Ok::<(), sea_orm::DbErr>(())
        })
    })
    .await
    .context("Failed to generate data")?;
    Ok(())
}
