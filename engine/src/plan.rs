use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use crate::error::{validate_round_number, validate_table_priority};
use crate::model::{MatchType, Snapshot, TableId, TeamId, Visibility};
use crate::pairing::{self, History, Pairing};
use crate::scoreboard::{Filter, ScoreAggregator};
use crate::tables::assign_tables;
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedMatch {
    pub match_type: MatchType,
    pub teams: Vec<TeamId>,
    pub table_id: Option<TableId>,
}

/// The next round of a tournament, computed but not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    pub number: i32,
    pub visibility: Visibility,
    // Normal matches first, then the bye.
    pub matches: Vec<PlannedMatch>,
    pub unpaired: Vec<TeamId>,
    // Every active team was placed in a match.
    pub success: bool,
}

impl RoundPlan {
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.matches.iter().flat_map(|m| m.teams.iter().copied())
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> + '_ {
        self.matches.iter().filter_map(|m| m.table_id)
    }
}

fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    for table in snapshot.tables.iter() {
        validate_table_priority(table.priority)
            .map_err(|e| Error::Validation(format!("Table {:?}: {e}", table.name)))?;
    }
    let teams = snapshot.teams.iter().map(|t| t.id).collect::<HashSet<_>>();
    let rounds = snapshot.rounds.iter().map(|r| r.id).collect::<HashSet<_>>();
    for m in snapshot.matches.iter() {
        if !rounds.contains(&m.round_id) {
            return Err(Error::Validation(format!(
                "Match {} belongs to unknown round {}",
                m.id, m.round_id
            )));
        }
        if let Some(id) = m.team_ids().find(|id| !teams.contains(id)) {
            return Err(Error::Validation(format!(
                "Match {} references unknown team {id}",
                m.id
            )));
        }
    }
    Ok(())
}

/// Computes the next round: pairing, byes and table assignment.
/// `rng` is only consulted for the first round.
pub fn plan_round<R: Rng + ?Sized>(snapshot: &Snapshot, rng: &mut R) -> Result<RoundPlan> {
    validate_snapshot(snapshot)?;
    let number = snapshot.latest_round_number().unwrap_or(0) + 1;
    validate_round_number(number)?;
    let teams = snapshot.active_team_ids();

    let pairing: Pairing = if snapshot.rounds.is_empty() {
        pairing::first_round(&teams, rng)
    } else {
        let scoreboard = ScoreAggregator::new(snapshot).team_scoreboard(&Filter::for_pairing());
        pairing::next_round(&teams, &scoreboard, &History::from_snapshot(snapshot))?
    };
    let table_ids = assign_tables(&pairing.pairs, &snapshot.tables, &snapshot.table_usage())?;

    let mut matches = pairing
        .pairs
        .iter()
        .zip(table_ids)
        .map(|(&(a, b), table_id)| PlannedMatch {
            match_type: MatchType::Normal,
            teams: vec![a, b],
            table_id,
        })
        .collect::<Vec<_>>();
    if let Some(id) = pairing.bye {
        matches.push(PlannedMatch {
            match_type: MatchType::Bye,
            teams: vec![id],
            table_id: None,
        });
    }
    let success = pairing.num_placed() == teams.len();
    log::debug!(
        "Planned round {number} with {} matches for {} teams",
        matches.len(),
        teams.len()
    );
    Ok(RoundPlan {
        number,
        visibility: snapshot.tournament.default_round_visibility,
        matches,
        unpaired: pairing.unpaired,
        success,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::testing::*;
    use crate::model::Round;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    fn count(plan: &RoundPlan, match_type: MatchType) -> usize {
        plan.matches
            .iter()
            .filter(|m| m.match_type == match_type)
            .count()
    }

    // Appends a plan to the snapshot as if it had been persisted and played.
    fn play(s: &mut Snapshot, plan: &RoundPlan) {
        let round_id = s.rounds.len() as i64 + 1;
        s.rounds.push(Round {
            id: round_id,
            number: plan.number,
            visibility: plan.visibility,
        });
        for pm in plan.matches.iter() {
            let id = s.matches.len() as i64 + 1;
            let mut m = match pm.match_type {
                MatchType::Bye => bye(id, round_id, pm.teams[0]),
                MatchType::Normal => normal(
                    id,
                    round_id,
                    result(pm.teams[0], Some(Decimal::from(pm.teams[0] % 3))),
                    result(pm.teams[1], Some(Decimal::from(pm.teams[1] % 4))),
                ),
            };
            m.table_id = pm.table_id;
            s.matches.push(m);
        }
    }

    #[test]
    fn test_first_round_sizes() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = plan_round(&snapshot(4), &mut rng).unwrap();
        assert_eq!(plan.number, 1);
        assert_eq!(count(&plan, MatchType::Normal), 2);
        assert_eq!(count(&plan, MatchType::Bye), 0);
        assert!(plan.success);
        let plan = plan_round(&snapshot(5), &mut rng).unwrap();
        assert_eq!(count(&plan, MatchType::Normal), 2);
        assert_eq!(count(&plan, MatchType::Bye), 1);
        assert_eq!(plan.matches.last().map(|m| m.match_type), Some(MatchType::Bye));
        assert!(plan.success);
    }

    #[test]
    fn test_rounds_without_repeats_or_double_byes() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = snapshot(7);
        s.tables = vec![table(1, 50), table(2, 80), table(3, 20)];
        let mut seen = HashSet::new();
        let mut byes = vec![];
        for number in 1..=3 {
            let plan = plan_round(&s, &mut rng).unwrap();
            assert_eq!(plan.number, number);
            assert!(plan.success, "round {number}: {:?}", plan.unpaired);
            let tables = plan.table_ids().collect::<Vec<_>>();
            assert_eq!(tables.len(), tables.iter().collect::<HashSet<_>>().len());
            for m in plan.matches.iter() {
                match m.match_type {
                    MatchType::Normal => {
                        assert!(seen.insert(crate::model::pair_key(m.teams[0], m.teams[1])));
                        assert!(m.table_id.is_some());
                    }
                    MatchType::Bye => {
                        assert_eq!(m.table_id, None);
                        byes.push(m.teams[0]);
                    }
                }
            }
            play(&mut s, &plan);
        }
        assert_eq!(byes.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_partial_pairing_is_not_an_error() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = snapshot(2);
        let plan = plan_round(&s, &mut rng).unwrap();
        play(&mut s, &plan);
        let plan = plan_round(&s, &mut rng).unwrap();
        assert_eq!(plan.number, 2);
        assert!(!plan.success);
        assert!(plan.matches.is_empty());
        assert_eq!(plan.unpaired, vec![1, 2]);
    }

    #[test]
    fn test_inactive_teams_are_skipped() {
        let mut s = snapshot(5);
        s.teams[4].active = false;
        let plan = plan_round(&s, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(count(&plan, MatchType::Normal), 2);
        assert!(plan.team_ids().all(|id| id != 5));
    }

    #[test]
    fn test_validation() {
        let mut s = snapshot(4);
        s.tables = vec![table(1, 101)];
        let err = plan_round(&s, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut s = snapshot(2);
        s.rounds.push(Round {
            id: 1,
            number: 1,
            visibility: Visibility::Show,
        });
        s.matches.push(bye(1, 1, 99));
        let err = plan_round(&s, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_visibility_follows_tournament() {
        let mut s = snapshot(2);
        s.tournament.default_round_visibility = Visibility::HideResults;
        let plan = plan_round(&s, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(plan.visibility, Visibility::HideResults);
    }
}
