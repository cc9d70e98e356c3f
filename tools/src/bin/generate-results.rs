use std::collections::HashMap;

use anyhow::anyhow;
use clap::Parser;
use rand::Rng;
use rust_decimal::Decimal;

use mtt_engine::model::{MatchType, PlayerId};
use mtt_server::store;

/// Fills random results into the unscored matches of the latest tournament.
#[derive(Parser, Debug)]
struct Config {
    #[arg(long)]
    db: String,
}

// Hands out a team's points among its players in steps of `step`.
fn split_points(
    rng: &mut impl Rng,
    players: &[PlayerId],
    total: Decimal,
    step: Decimal,
) -> HashMap<PlayerId, Decimal> {
    let mut points = players
        .iter()
        .map(|id| (*id, Decimal::ZERO))
        .collect::<HashMap<_, _>>();
    if players.is_empty() {
        return points;
    }
    let mut left = total;
    while left > Decimal::ZERO {
        let id = players[rng.gen_range(0..players.len())];
        let share = step.min(left);
        *points.entry(id).or_default() += share;
        left -= share;
    }
    points
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    let db = sea_orm::Database::connect(&cfg.db).await?;
    let tournament_id = store::latest_tournament(&db)
        .await?
        .ok_or_else(|| anyhow!("There are no tournaments"))?;
    let snapshot = store::load_snapshot(&db, tournament_id).await?;
    println!("Tournament {tournament_id}: {}", snapshot.tournament.name);
    let total = snapshot.tournament.bye_score;
    let half = Decimal::new(5, 1);
    let mut rng = rand::thread_rng();
    for m in snapshot.matches.iter() {
        if m.match_type != MatchType::Normal || m.is_completed() || !m.is_valid() {
            continue;
        }
        let (a, b) = (m.team_results[0].team_id, m.team_results[1].team_id);
        // Lower ids are stronger.
        let p = 1.0 / (1.0 + 1.5f64.powf((a - b) as f64));
        let mut scores = (Decimal::ZERO, Decimal::ZERO);
        while scores.0 + scores.1 < total {
            if rng.gen::<f64>() < p {
                scores.0 += half;
            } else {
                scores.1 += half;
            }
        }
        store::record_team_score(&db, m.id, a, Some(scores.0)).await?;
        store::record_team_score(&db, m.id, b, Some(scores.1)).await?;
        println!("Match {}: team {a} {} - {} team {b}", m.id, scores.0, scores.1);
        for (team_id, team_score) in [(a, scores.0), (b, scores.1)] {
            let players = m
                .player_results
                .iter()
                .filter(|r| r.team_id == team_id)
                .map(|r| r.player_id)
                .collect::<Vec<_>>();
            for (player_id, score) in split_points(&mut rng, &players, team_score, half) {
                store::record_player_score(&db, m.id, player_id, Some(score)).await?;
            }
        }
    }
    Ok(())
}
