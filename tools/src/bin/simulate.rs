use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{anyhow, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sea_orm::prelude::TimeDateTimeWithTimeZone;
use sea_orm::{ConnectOptions, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use mtt_db as db;
use mtt_engine::model::{MatchType, TeamId};
use mtt_server::config::RoundConfig;
use mtt_server::round_builder::{self, RoundLocks};
use mtt_server::store;

const TEAM_NAMES: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

/// Plays many tournaments with random outcomes and reports how many distinct
/// tables each one used.
#[derive(Parser, Debug)]
struct Config {
    #[arg(long, default_value = "sqlite::memory:")]
    db: String,
    #[arg(short = 't', long, default_value_t = 16)]
    num_teams: usize,
    #[arg(short = 's', long, default_value_t = 100)]
    num_simulations: usize,
    #[arg(short = 'r', long, default_value_t = 4)]
    num_rounds: usize,
    #[arg(long, default_value_t = 20)]
    num_tables: usize,
    #[arg(long)]
    seed: Option<u64>,
    // Probability that the stronger team wins.
    #[arg(default_value_t = 0.4)]
    alpha: f64,
    // Probability that the weaker team wins; a draw otherwise.
    #[arg(default_value_t = 0.4)]
    beta: f64,
}

fn validate(cfg: &Config) -> anyhow::Result<()> {
    if cfg.num_teams > TEAM_NAMES.len() {
        return Err(anyhow!("At most {} teams are supported", TEAM_NAMES.len()));
    }
    if cfg.num_tables > 100 {
        return Err(anyhow!("At most 100 tables are supported"));
    }
    if cfg.alpha < 0.0 || cfg.beta < 0.0 || cfg.alpha + cfg.beta > 1.0 {
        return Err(anyhow!(
            "alpha and beta must be non-negative and sum to at most 1"
        ));
    }
    Ok(())
}

async fn connect(url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(url);
    options.max_connections(1);
    let db = sea_orm::Database::connect(options)
        .await
        .context(format!("Failed to connect to {url}"))?;
    migration::Migrator::up(&db, None)
        .await
        .context("Failed to apply migrations")?;
    Ok(db)
}

async fn setup(db: &DatabaseConnection, cfg: &Config) -> anyhow::Result<(i64, Vec<TeamId>)> {
    let tournament = db::tournaments::ActiveModel {
        name: Set("Simulated tournament".to_owned()),
        creation_time: Set(TimeDateTimeWithTimeZone::now_utc()),
        bye_score: Set(1.0),
        default_round_visibility: Set(db::common::Visibility::Show),
        shown_players: Set(None),
        ..Default::default()
    };
    let tournament_id = db::prelude::Tournaments::insert(tournament)
        .exec(db)
        .await?
        .last_insert_id;
    let mut team_ids = vec![];
    for name in TEAM_NAMES.iter().take(cfg.num_teams) {
        let team = db::teams::ActiveModel {
            name: Set(format!("Sim {name}")),
            active: Set(true),
            ..Default::default()
        };
        team_ids.push(db::prelude::Teams::insert(team).exec(db).await?.last_insert_id);
    }
    for i in 1..=cfg.num_tables {
        let table = db::tables::ActiveModel {
            name: Set(format!("T{i:02}")),
            description: Set(None),
            priority: Set(100 - i as i32),
            ..Default::default()
        };
        db::prelude::Tables::insert(table).exec(db).await?;
    }
    Ok((tournament_id, team_ids))
}

// Scores of (stronger, weaker).
fn outcome(rng: &mut StdRng, cfg: &Config) -> (Decimal, Decimal) {
    let x = rng.gen::<f64>();
    if x < cfg.alpha {
        (Decimal::ONE, Decimal::ZERO)
    } else if x < cfg.alpha + cfg.beta {
        (Decimal::ZERO, Decimal::ONE)
    } else {
        let half = Decimal::new(5, 1);
        (half, half)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .filter_module("sqlx", log::LevelFilter::Error)
        .init();
    let cfg = Config::parse();
    validate(&cfg)?;
    println!("Probability of victory of stronger team: {:.2}", cfg.alpha);
    println!("Probability of victory of weaker team: {:.2}", cfg.beta);

    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let db = connect(&cfg.db).await?;
    let (tournament_id, team_ids) = setup(&db, &cfg).await?;
    let mut strength_order = (0..team_ids.len()).collect::<Vec<_>>();
    strength_order.shuffle(&mut rng);
    let strengths = team_ids
        .iter()
        .copied()
        .zip(strength_order)
        .collect::<HashMap<TeamId, usize>>();
    let mut by_strength = team_ids.clone();
    by_strength.sort_by_key(|id| std::cmp::Reverse(strengths[id]));
    println!("Teams sorted by decreasing strength: {by_strength:?}");

    let locks = RoundLocks::new();
    let mut stats = BTreeMap::<usize, usize>::new();
    for i in 0..cfg.num_simulations {
        db::prelude::Rounds::delete_many()
            .exec(&db)
            .await
            .context("Failed to clear rounds")?;
        let mut used_tables = HashSet::new();
        let mut numbers = vec![];
        for _ in 0..cfg.num_rounds {
            let round_config = RoundConfig {
                pairing_timeout: None,
                seed: Some(rng.gen()),
            };
            let round = round_builder::create_round(
                &db,
                &locks,
                tournament_id,
                &round_config,
                round_builder::rng(&round_config),
            )
            .await?;
            numbers.push(round.number);
            for m in round.matches.iter() {
                if m.match_type != MatchType::Normal {
                    continue;
                }
                used_tables.extend(m.table_id);
                let (mut a, mut b) = (m.teams[0], m.teams[1]);
                if strengths[&a] < strengths[&b] {
                    std::mem::swap(&mut a, &mut b);
                }
                let (score_a, score_b) = outcome(&mut rng, &cfg);
                store::record_team_score(&db, m.id, a, Some(score_a)).await?;
                store::record_team_score(&db, m.id, b, Some(score_b)).await?;
            }
        }
        println!(
            "Simulation {i} -- Rounds {numbers:?} -- Used {} tables",
            used_tables.len()
        );
        *stats.entry(used_tables.len()).or_default() += 1;
    }
    println!("Simulations by number of tables used: {stats:?}");
    Ok(())
}
