use sea_orm::ConnectionTrait;
use serde::Serialize;

use mtt_engine::scoreboard::{Filter, ScoreAggregator, Standing};

use crate::error::RoundError;
use crate::store;

#[derive(Clone, Debug, Serialize)]
pub struct Scoreboards {
    pub tournament_id: i64,
    pub teams: Vec<Standing>,
    // Truncated to the tournament's shown_players.
    pub players: Vec<Standing>,
}

/// Ranked team and player standings. A public scoreboard only counts rounds
/// whose results are shown.
pub async fn load_scoreboards<C: ConnectionTrait>(
    db: &C,
    tournament_id: i64,
    public: bool,
) -> Result<Scoreboards, RoundError> {
    let snapshot = store::load_snapshot(db, tournament_id).await?;
    let filter = if public {
        Filter::public()
    } else {
        Filter::default()
    };
    let aggregator = ScoreAggregator::new(&snapshot);
    Ok(Scoreboards {
        tournament_id,
        teams: aggregator.team_standings(&filter),
        players: aggregator.player_standings(&filter),
    })
}
