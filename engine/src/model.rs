use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type TeamId = i64;
pub type PlayerId = i64;
pub type TableId = i64;
pub type RoundId = i64;
pub type MatchId = i64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MatchType {
    #[default]
    Normal,
    Bye,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Visibility {
    Hide,
    HideResults,
    #[default]
    Show,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub bye_score: Decimal,
    pub default_round_visibility: Visibility,
    // None shows every player, Some(0) hides the player scoreboard.
    pub shown_players: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub is_captain: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub priority: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub id: RoundId,
    pub number: i32,
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeamResult {
    pub team_id: TeamId,
    pub score: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    // Team the player represented in this match.
    pub team_id: TeamId,
    pub score: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    pub id: MatchId,
    pub round_id: RoundId,
    pub match_type: MatchType,
    pub table_id: Option<TableId>,
    pub team_results: Vec<TeamResult>,
    pub player_results: Vec<PlayerResult>,
}

impl Match {
    pub fn is_valid(&self) -> bool {
        match self.match_type {
            MatchType::Bye => self.team_results.len() == 1,
            MatchType::Normal => self.team_results.len() == 2,
        }
    }

    /// Byes are complete as soon as they exist; normal matches once every team has a score.
    pub fn is_completed(&self) -> bool {
        match self.match_type {
            MatchType::Bye => true,
            MatchType::Normal => {
                !self.team_results.is_empty()
                    && self.team_results.iter().all(|r| r.score.is_some())
            }
        }
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.team_results.iter().map(|r| r.team_id)
    }
}

/// Everything round planning needs, read from the store up front.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub tournament: Tournament,
    // Ordered by id.
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub tables: Vec<Table>,
    pub rounds: Vec<Round>,
    pub matches: Vec<Match>,
}

pub fn pair_key(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Snapshot {
    pub fn active_team_ids(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| t.active)
            .map(|t| t.id)
            .collect()
    }

    pub fn latest_round_number(&self) -> Option<i32> {
        self.rounds.iter().map(|r| r.number).max()
    }

    pub fn round_visibility(&self) -> HashMap<RoundId, Visibility> {
        self.rounds.iter().map(|r| (r.id, r.visibility)).collect()
    }

    pub fn roster(&self, team_id: TeamId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.team_id == Some(team_id))
            .map(|p| p.id)
            .collect()
    }

    pub fn previous_pairs(&self) -> HashSet<(TeamId, TeamId)> {
        let mut pairs = HashSet::new();
        for m in self.matches.iter() {
            if m.match_type != MatchType::Normal {
                continue;
            }
            let ids = m.team_ids().collect::<Vec<_>>();
            for (i, a) in ids.iter().enumerate() {
                for b in ids[i + 1..].iter() {
                    pairs.insert(pair_key(*a, *b));
                }
            }
        }
        pairs
    }

    pub fn bye_counts(&self) -> HashMap<TeamId, usize> {
        let mut counts = HashMap::<TeamId, usize>::new();
        for m in self.matches.iter() {
            if m.match_type == MatchType::Bye {
                for id in m.team_ids() {
                    *counts.entry(id).or_default() += 1;
                }
            }
        }
        counts
    }

    pub fn table_usage(&self) -> HashSet<(TeamId, TableId)> {
        self.matches
            .iter()
            .filter_map(|m| m.table_id.map(|table_id| (m, table_id)))
            .flat_map(|(m, table_id)| m.team_ids().map(move |team_id| (team_id, table_id)))
            .collect()
    }
}


#[cfg(test)]
mod test {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_match_validity_and_completion() {
        let m = normal(1, 1, result(1, None), result(2, Some(Decimal::ONE)));
        assert!(m.is_valid());
        assert!(!m.is_completed());
        let m = normal(
            1,
            1,
            result(1, Some(Decimal::ZERO)),
            result(2, Some(Decimal::ONE)),
        );
        assert!(m.is_completed());
        let b = bye(2, 1, 3);
        assert!(b.is_valid());
        assert!(b.is_completed());
        let mut broken = b.clone();
        broken.team_results.push(result(4, None));
        assert!(!broken.is_valid());
    }

    #[test]
    fn test_history_views() {
        let mut s = snapshot(5);
        let mut m = normal(1, 1, result(3, None), result(1, None));
        m.table_id = Some(7);
        s.matches.push(m);
        s.matches.push(normal(2, 1, result(2, None), result(4, None)));
        s.matches.push(bye(3, 1, 5));
        assert_eq!(
            s.previous_pairs(),
            HashSet::from([(1, 3), (2, 4)]),
        );
        assert_eq!(s.bye_counts(), HashMap::from([(5, 1)]));
        assert_eq!(s.table_usage(), HashSet::from([(1, 7), (3, 7)]));
    }
}
