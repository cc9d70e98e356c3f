//! Explicit reads and writes of tournament data.
//!
//! Everything round planning needs is read up front into a [`Snapshot`];
//! writes happen only after planning, inside the same transaction.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Context};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Serialize;

use mtt_db as db;
use mtt_engine::model::{
    Match, MatchId, MatchType, Player, PlayerId, PlayerResult, Round, Snapshot, Table,
    TableId, Team, TeamId, TeamResult, Tournament, Visibility,
};
use mtt_engine::plan::RoundPlan;

use crate::error::{db_error, RoundError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedMatch {
    pub id: MatchId,
    pub match_type: MatchType,
    pub teams: Vec<TeamId>,
    pub table_id: Option<TableId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedRound {
    pub round_id: i64,
    pub number: i32,
    pub visibility: Visibility,
    pub matches: Vec<CreatedMatch>,
    pub success: bool,
    pub unpaired: Vec<TeamId>,
}

pub fn visibility_from_db(v: db::common::Visibility) -> Visibility {
    match v {
        db::common::Visibility::Hide => Visibility::Hide,
        db::common::Visibility::HideResults => Visibility::HideResults,
        db::common::Visibility::Show => Visibility::Show,
    }
}

pub fn visibility_to_db(v: Visibility) -> db::common::Visibility {
    match v {
        Visibility::Hide => db::common::Visibility::Hide,
        Visibility::HideResults => db::common::Visibility::HideResults,
        Visibility::Show => db::common::Visibility::Show,
    }
}

fn match_type_from_db(t: db::common::MatchType) -> MatchType {
    match t {
        db::common::MatchType::Normal => MatchType::Normal,
        db::common::MatchType::Bye => MatchType::Bye,
    }
}

fn match_type_to_db(t: MatchType) -> db::common::MatchType {
    match t {
        MatchType::Normal => db::common::MatchType::Normal,
        MatchType::Bye => db::common::MatchType::Bye,
    }
}

/// Scores are stored with one decimal place.
pub fn score_from_db(v: f64) -> Result<Decimal, RoundError> {
    Decimal::from_f64(v)
        .map(|d| d.round_dp(1))
        .ok_or_else(|| {
            RoundError::Engine(mtt_engine::Error::Validation(format!(
                "Stored score {v} is not a number"
            )))
        })
}

pub fn score_to_db(d: Decimal) -> anyhow::Result<f64> {
    d.round_dp(1)
        .to_f64()
        .ok_or_else(|| anyhow!("Score {d} cannot be stored"))
}

fn optional_score(v: Option<f64>) -> Result<Option<Decimal>, RoundError> {
    v.map(score_from_db).transpose()
}

pub async fn load_snapshot<C: ConnectionTrait>(
    db: &C,
    tournament_id: i64,
) -> Result<Snapshot, RoundError> {
    let Some(tournament) = db::prelude::Tournaments::find_by_id(tournament_id)
        .one(db)
        .await
        .map_err(db_error(format!("Failed to fetch tournament {tournament_id}")))?
    else {
        return Err(RoundError::TournamentNotFound(tournament_id));
    };
    let teams = db::prelude::Teams::find()
        .order_by_asc(db::teams::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch teams"))?;
    let players = db::prelude::Players::find()
        .order_by_asc(db::players::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch players"))?;
    let tables = db::prelude::Tables::find()
        .order_by_asc(db::tables::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch tables"))?;
    let rounds = db::prelude::Rounds::find()
        .filter(db::rounds::Column::TournamentId.eq(tournament_id))
        .order_by_asc(db::rounds::Column::Number)
        .all(db)
        .await
        .map_err(db_error(format!(
            "Failed to fetch rounds of tournament {tournament_id}"
        )))?;
    let matches = db::prelude::Matches::find()
        .filter(db::matches::Column::RoundId.is_in(rounds.iter().map(|r| r.id)))
        .order_by_asc(db::matches::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch matches"))?;
    let match_ids = matches.iter().map(|m| m.id).collect::<Vec<_>>();
    let team_results = db::prelude::TeamResults::find()
        .filter(db::team_results::Column::MatchId.is_in(match_ids.iter().copied()))
        .order_by_asc(db::team_results::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch team results"))?;
    let player_results = db::prelude::PlayerResults::find()
        .filter(db::player_results::Column::MatchId.is_in(match_ids.iter().copied()))
        .order_by_asc(db::player_results::Column::Id)
        .all(db)
        .await
        .map_err(db_error("Failed to fetch player results"))?;

    let mut team_results_by_match = HashMap::<MatchId, Vec<TeamResult>>::new();
    for r in team_results {
        team_results_by_match
            .entry(r.match_id)
            .or_default()
            .push(TeamResult {
                team_id: r.team_id,
                score: optional_score(r.score)?,
            });
    }
    let mut player_results_by_match = HashMap::<MatchId, Vec<PlayerResult>>::new();
    for r in player_results {
        player_results_by_match
            .entry(r.match_id)
            .or_default()
            .push(PlayerResult {
                player_id: r.player_id,
                team_id: r.team_id,
                score: optional_score(r.score)?,
            });
    }

    Ok(Snapshot {
        tournament: Tournament {
            id: tournament.id,
            name: tournament.name,
            bye_score: score_from_db(tournament.bye_score)?,
            default_round_visibility: visibility_from_db(tournament.default_round_visibility),
            shown_players: tournament.shown_players.map(|n| n.max(0) as u32),
        },
        teams: teams
            .into_iter()
            .map(|t| Team {
                id: t.id,
                name: t.name,
                active: t.active,
            })
            .collect(),
        players: players
            .into_iter()
            .map(|p| Player {
                id: p.id,
                name: p.name,
                team_id: p.team_id,
                is_captain: p.is_captain,
            })
            .collect(),
        tables: tables
            .into_iter()
            .map(|t| Table {
                id: t.id,
                name: t.name,
                priority: t.priority,
            })
            .collect(),
        rounds: rounds
            .into_iter()
            .map(|r| Round {
                id: r.id,
                number: r.number,
                visibility: visibility_from_db(r.visibility),
            })
            .collect(),
        matches: matches
            .into_iter()
            .map(|m| Match {
                id: m.id,
                round_id: m.round_id,
                match_type: match_type_from_db(m.match_type),
                table_id: m.table_id,
                team_results: team_results_by_match.remove(&m.id).unwrap_or_default(),
                player_results: player_results_by_match.remove(&m.id).unwrap_or_default(),
            })
            .collect(),
    })
}

/// Adds a team to a match together with an empty result for each player of
/// its roster.
pub async fn insert_team_result<C: ConnectionTrait>(
    db: &C,
    match_id: MatchId,
    team_id: TeamId,
    roster: &[PlayerId],
) -> Result<i64, RoundError> {
    let team_result = db::team_results::ActiveModel {
        match_id: Set(match_id),
        team_id: Set(team_id),
        score: Set(None),
        ..Default::default()
    };
    let id = db::prelude::TeamResults::insert(team_result)
        .exec(db)
        .await
        .map_err(db_error(format!(
            "Failed to add team {team_id} to match {match_id}"
        )))?
        .last_insert_id;
    if roster.is_empty() {
        return Ok(id);
    }
    let player_results = roster.iter().map(|player_id| db::player_results::ActiveModel {
        match_id: Set(match_id),
        player_id: Set(*player_id),
        team_id: Set(team_id),
        score: Set(None),
        ..Default::default()
    });
    db::prelude::PlayerResults::insert_many(player_results)
        .exec(db)
        .await
        .map_err(db_error(format!(
            "Failed to add players of team {team_id} to match {match_id}"
        )))?;
    Ok(id)
}

/// Removes a team from a match together with the player results created for
/// its roster at that time.
pub async fn delete_team_result<C: ConnectionTrait>(
    db: &C,
    team_result_id: i64,
) -> Result<(), RoundError> {
    let Some(team_result) = db::prelude::TeamResults::find_by_id(team_result_id)
        .one(db)
        .await
        .map_err(db_error(format!("Failed to fetch team result {team_result_id}")))?
    else {
        return Ok(());
    };
    db::prelude::PlayerResults::delete_many()
        .filter(
            Condition::all()
                .add(db::player_results::Column::MatchId.eq(team_result.match_id))
                .add(db::player_results::Column::TeamId.eq(team_result.team_id)),
        )
        .exec(db)
        .await
        .map_err(db_error("Failed to delete player results"))?;
    db::prelude::TeamResults::delete_by_id(team_result_id)
        .exec(db)
        .await
        .map_err(db_error(format!("Failed to delete team result {team_result_id}")))?;
    Ok(())
}

/// Checks inside the write transaction that everything the plan refers to
/// still exists and that the round number is still free.
pub async fn verify_references<C: ConnectionTrait>(
    db: &C,
    tournament_id: i64,
    plan: &RoundPlan,
) -> Result<(), RoundError> {
    let team_ids = plan.team_ids().collect::<HashSet<_>>();
    let found_teams = db::prelude::Teams::find()
        .filter(db::teams::Column::Id.is_in(team_ids.iter().copied()))
        .all(db)
        .await
        .map_err(db_error("Failed to re-read teams"))?;
    let found_teams = found_teams.iter().map(|t| t.id).collect::<HashSet<_>>();
    if let Some(missing) = team_ids.difference(&found_teams).next() {
        return Err(RoundError::StaleSnapshot(format!("team {missing} is gone")));
    }
    let table_ids = plan.table_ids().collect::<HashSet<_>>();
    let found_tables = db::prelude::Tables::find()
        .filter(db::tables::Column::Id.is_in(table_ids.iter().copied()))
        .all(db)
        .await
        .map_err(db_error("Failed to re-read tables"))?;
    let found_tables = found_tables.iter().map(|t| t.id).collect::<HashSet<_>>();
    if let Some(missing) = table_ids.difference(&found_tables).next() {
        return Err(RoundError::StaleSnapshot(format!("table {missing} is gone")));
    }
    let taken = db::prelude::Rounds::find()
        .filter(
            Condition::all()
                .add(db::rounds::Column::TournamentId.eq(tournament_id))
                .add(db::rounds::Column::Number.eq(plan.number)),
        )
        .count(db)
        .await
        .map_err(db_error("Failed to re-read rounds"))?;
    if taken > 0 {
        return Err(RoundError::StaleSnapshot(format!(
            "round {} already exists",
            plan.number
        )));
    }
    Ok(())
}

pub async fn persist_plan<C: ConnectionTrait>(
    db: &C,
    snapshot: &Snapshot,
    plan: &RoundPlan,
) -> Result<CreatedRound, RoundError> {
    let tournament_id = snapshot.tournament.id;
    let round = db::rounds::ActiveModel {
        tournament_id: Set(tournament_id),
        number: Set(plan.number),
        visibility: Set(visibility_to_db(plan.visibility)),
        scheduled_time: Set(None),
        ..Default::default()
    };
    let round_id = db::prelude::Rounds::insert(round)
        .exec(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                RoundError::StaleSnapshot(format!("round {} already exists", plan.number))
            }
            _ => RoundError::Db {
                context: format!(
                    "Failed to create round {} of tournament {tournament_id}",
                    plan.number
                ),
                db_error: e,
            },
        })?
        .last_insert_id;

    let mut matches = Vec::with_capacity(plan.matches.len());
    for pm in plan.matches.iter() {
        let m = db::matches::ActiveModel {
            round_id: Set(round_id),
            match_type: Set(match_type_to_db(pm.match_type)),
            table_id: Set(pm.table_id),
            ..Default::default()
        };
        let match_id = db::prelude::Matches::insert(m)
            .exec(db)
            .await
            .map_err(db_error(format!("Failed to create a match in round {round_id}")))?
            .last_insert_id;
        for team_id in pm.teams.iter() {
            insert_team_result(db, match_id, *team_id, &snapshot.roster(*team_id)).await?;
        }
        matches.push(CreatedMatch {
            id: match_id,
            match_type: pm.match_type,
            teams: pm.teams.clone(),
            table_id: pm.table_id,
        });
    }
    Ok(CreatedRound {
        round_id,
        number: plan.number,
        visibility: plan.visibility,
        matches,
        success: plan.success,
        unpaired: plan.unpaired.clone(),
    })
}

pub async fn record_team_score<C: ConnectionTrait>(
    db: &C,
    match_id: MatchId,
    team_id: TeamId,
    score: Option<Decimal>,
) -> anyhow::Result<()> {
    let update = db::team_results::ActiveModel {
        score: Set(score.map(score_to_db).transpose()?),
        ..Default::default()
    };
    let result = db::prelude::TeamResults::update_many()
        .set(update)
        .filter(
            Condition::all()
                .add(db::team_results::Column::MatchId.eq(match_id))
                .add(db::team_results::Column::TeamId.eq(team_id)),
        )
        .exec(db)
        .await
        .context(format!(
            "Failed to record score of team {team_id} in match {match_id}"
        ))?;
    if result.rows_affected == 0 {
        return Err(anyhow!("Team {team_id} does not play in match {match_id}"));
    }
    Ok(())
}

pub async fn record_player_score<C: ConnectionTrait>(
    db: &C,
    match_id: MatchId,
    player_id: PlayerId,
    score: Option<Decimal>,
) -> anyhow::Result<()> {
    let update = db::player_results::ActiveModel {
        score: Set(score.map(score_to_db).transpose()?),
        ..Default::default()
    };
    let result = db::prelude::PlayerResults::update_many()
        .set(update)
        .filter(
            Condition::all()
                .add(db::player_results::Column::MatchId.eq(match_id))
                .add(db::player_results::Column::PlayerId.eq(player_id)),
        )
        .exec(db)
        .await
        .context(format!(
            "Failed to record score of player {player_id} in match {match_id}"
        ))?;
    if result.rows_affected == 0 {
        return Err(anyhow!(
            "Player {player_id} has no result in match {match_id}"
        ));
    }
    Ok(())
}

/// Most recently created tournament, if any.
pub async fn latest_tournament<C: ConnectionTrait>(db: &C) -> anyhow::Result<Option<i64>> {
    let t = db::prelude::Tournaments::find()
        .order_by_desc(db::tournaments::Column::Id)
        .one(db)
        .await
        .context("Failed to fetch the latest tournament")?;
    Ok(t.map(|t| t.id))
}


#[cfg(test)]
mod test {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_load_empty_snapshot() {
        let db = db().await;
        assert!(matches!(
            load_snapshot(&db, 1).await,
            Err(RoundError::TournamentNotFound(1))
        ));
        let id = tournament(&db, "t").await;
        teams(&db, 3, 2).await;
        tables(&db, &[10, 90]).await;
        let s = load_snapshot(&db, id).await.unwrap();
        assert_eq!(s.tournament.bye_score, Decimal::from(3));
        assert_eq!(s.teams.len(), 3);
        assert_eq!(s.players.len(), 6);
        assert_eq!(s.tables.iter().map(|t| t.priority).collect::<Vec<_>>(), vec![10, 90]);
        assert!(s.rounds.is_empty());
        assert!(s.matches.is_empty());
    }

    #[tokio::test]
    async fn test_team_result_cascades_to_players() {
        let db = db().await;
        let id = tournament(&db, "t").await;
        let team_ids = teams(&db, 2, 3).await;
        let snapshot = load_snapshot(&db, id).await.unwrap();
        let plan = RoundPlan {
            number: 1,
            visibility: Visibility::Show,
            matches: vec![mtt_engine::plan::PlannedMatch {
                match_type: MatchType::Normal,
                teams: team_ids.clone(),
                table_id: None,
            }],
            unpaired: vec![],
            success: true,
        };
        verify_references(&db, id, &plan).await.unwrap();
        let created = persist_plan(&db, &snapshot, &plan).await.unwrap();
        assert_eq!(created.number, 1);
        let match_id = created.matches[0].id;

        let s = load_snapshot(&db, id).await.unwrap();
        assert_eq!(s.rounds.len(), 1);
        assert_eq!(s.matches[0].team_results.len(), 2);
        assert_eq!(s.matches[0].player_results.len(), 6);
        assert!(!s.matches[0].is_completed());

        record_team_score(&db, match_id, team_ids[0], Some(Decimal::new(25, 1)))
            .await
            .unwrap();
        record_team_score(&db, match_id, team_ids[1], Some(Decimal::ONE))
            .await
            .unwrap();
        assert!(record_team_score(&db, match_id, 999, None).await.is_err());
        let s = load_snapshot(&db, id).await.unwrap();
        assert!(s.matches[0].is_completed());
        assert_eq!(s.matches[0].team_results[0].score, Some(Decimal::new(25, 1)));

        let player_id = snapshot.roster(team_ids[0])[0];
        record_player_score(&db, match_id, player_id, Some(Decimal::new(15, 1)))
            .await
            .unwrap();
        assert!(record_player_score(&db, match_id, 999, None).await.is_err());
        let s = load_snapshot(&db, id).await.unwrap();
        let result = s.matches[0]
            .player_results
            .iter()
            .find(|r| r.player_id == player_id)
            .expect("player result missing");
        assert_eq!(result.team_id, team_ids[0]);
        assert_eq!(result.score, Some(Decimal::new(15, 1)));

        let team_result = db::prelude::TeamResults::find()
            .filter(db::team_results::Column::TeamId.eq(team_ids[1]))
            .one(&db)
            .await
            .unwrap()
            .expect("team result missing");
        delete_team_result(&db, team_result.id).await.unwrap();
        let s = load_snapshot(&db, id).await.unwrap();
        assert_eq!(s.matches[0].team_results.len(), 1);
        assert_eq!(s.matches[0].player_results.len(), 3);

        // The round number is now taken.
        assert!(matches!(
            verify_references(&db, id, &plan).await,
            Err(RoundError::StaleSnapshot(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_team_result_after_roster_change() {
        let db = db().await;
        let id = tournament(&db, "t").await;
        let team_ids = teams(&db, 2, 2).await;
        let snapshot = load_snapshot(&db, id).await.unwrap();
        let plan = RoundPlan {
            number: 1,
            visibility: Visibility::Show,
            matches: vec![mtt_engine::plan::PlannedMatch {
                match_type: MatchType::Normal,
                teams: team_ids.clone(),
                table_id: None,
            }],
            unpaired: vec![],
            success: true,
        };
        let created = persist_plan(&db, &snapshot, &plan).await.unwrap();
        let match_id = created.matches[0].id;
        let first_roster = snapshot.roster(team_ids[0]);
        let mut second_roster = snapshot.roster(team_ids[1]);
        second_roster.sort();

        let moved = db::players::ActiveModel {
            id: Set(first_roster[0]),
            team_id: Set(Some(team_ids[1])),
            ..Default::default()
        };
        db::prelude::Players::update(moved).exec(&db).await.unwrap();

        let team_result = db::prelude::TeamResults::find()
            .filter(db::team_results::Column::MatchId.eq(match_id))
            .filter(db::team_results::Column::TeamId.eq(team_ids[0]))
            .one(&db)
            .await
            .unwrap()
            .expect("team result missing");
        delete_team_result(&db, team_result.id).await.unwrap();

        let mut left = db::prelude::PlayerResults::find()
            .filter(db::player_results::Column::MatchId.eq(match_id))
            .all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.player_id)
            .collect::<Vec<_>>();
        left.sort();
        assert_eq!(left, second_roster);
    }

    #[tokio::test]
    async fn test_verify_missing_table() {
        let db = db().await;
        let id = tournament(&db, "t").await;
        let team_ids = teams(&db, 2, 0).await;
        let plan = RoundPlan {
            number: 1,
            visibility: Visibility::Show,
            matches: vec![mtt_engine::plan::PlannedMatch {
                match_type: MatchType::Normal,
                teams: team_ids,
                table_id: Some(42),
            }],
            unpaired: vec![],
            success: true,
        };
        assert!(matches!(
            verify_references(&db, id, &plan).await,
            Err(RoundError::StaleSnapshot(_))
        ));
    }

    #[test]
    fn test_score_conversion() {
        assert_eq!(score_from_db(2.5).unwrap(), Decimal::new(25, 1));
        assert_eq!(score_from_db(0.1 + 0.2).unwrap(), Decimal::new(3, 1));
        assert!(score_from_db(f64::NAN).is_err());
        assert_eq!(score_to_db(Decimal::new(15, 1)).unwrap(), 1.5);
    }
}
