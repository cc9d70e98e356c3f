use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::*;
use crate::score::{self, Score};

/// Which matches contribute to a scoreboard.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter {
    pub round_id: Option<RoundId>,
    // Matches of rounds that are not fully shown contribute nothing.
    pub public_only: bool,
    // Credit unscored normal matches as wins; only used for pairing.
    pub fill_results: bool,
}

impl Filter {
    pub fn public() -> Self {
        Filter {
            public_only: true,
            ..Default::default()
        }
    }

    pub fn for_pairing() -> Self {
        Filter {
            fill_results: true,
            ..Default::default()
        }
    }
}

pub fn match_team_scores(
    m: &Match,
    bye_score: Decimal,
    visibility: Visibility,
    filter: &Filter,
) -> Vec<(TeamId, Score)> {
    if filter.public_only && visibility != Visibility::Show {
        return vec![];
    }
    if !m.is_valid() {
        log::warn!(
            "Skipping invalid match {}: {:?} with {} teams",
            m.id,
            m.match_type,
            m.team_results.len()
        );
        return vec![];
    }
    if m.match_type == MatchType::Bye {
        return m.team_ids().map(|id| (id, Score::bye(bye_score))).collect();
    }
    if !m.is_completed() {
        if !filter.fill_results {
            return vec![];
        }
        return m
            .team_ids()
            .map(|id| {
                (
                    id,
                    Score::single(Decimal::ONE, bye_score, MatchType::Normal),
                )
            })
            .collect();
    }
    let points = m
        .team_results
        .iter()
        .filter_map(|r| r.score.map(|s| (r.team_id, s)))
        .collect::<Vec<_>>();
    let best = points.iter().map(|(_, s)| *s).max().unwrap_or_default();
    let draw = points.iter().all(|(_, s)| *s == best);
    points
        .into_iter()
        .map(|(id, s)| {
            let primary = if draw {
                Decimal::new(5, 1)
            } else if s == best {
                Decimal::ONE
            } else {
                Decimal::ZERO
            };
            (id, Score::single(primary, s, MatchType::Normal))
        })
        .collect()
}

pub fn match_player_scores(
    m: &Match,
    bye_score: Decimal,
    visibility: Visibility,
    filter: &Filter,
) -> Vec<(PlayerId, Score)> {
    if filter.public_only && visibility != Visibility::Show {
        return vec![];
    }
    match m.match_type {
        MatchType::Bye => m
            .player_results
            .iter()
            .map(|p| (p.player_id, Score::bye(bye_score)))
            .collect(),
        MatchType::Normal => m
            .player_results
            .iter()
            .filter_map(|p| {
                p.score
                    .map(|s| (p.player_id, Score::single(s, s, MatchType::Normal)))
            })
            .collect(),
    }
}

pub struct ScoreAggregator<'a> {
    snapshot: &'a Snapshot,
    visibility: HashMap<RoundId, Visibility>,
}

impl<'a> ScoreAggregator<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        ScoreAggregator {
            snapshot,
            visibility: snapshot.round_visibility(),
        }
    }

    fn matches<'b>(&'b self, filter: &'b Filter) -> impl Iterator<Item = (&'a Match, Visibility)> + 'b {
        self.snapshot
            .matches
            .iter()
            .filter(move |m| filter.round_id.map_or(true, |r| m.round_id == r))
            .map(move |m| {
                // A match of an unknown round is never public.
                let v = self
                    .visibility
                    .get(&m.round_id)
                    .copied()
                    .unwrap_or(Visibility::Hide);
                (m, v)
            })
    }

    /// Scores of all active teams, zero for teams that have not played.
    pub fn team_scoreboard(&self, filter: &Filter) -> HashMap<TeamId, Score> {
        let bye_score = self.snapshot.tournament.bye_score;
        let mut board = self
            .snapshot
            .teams
            .iter()
            .filter(|t| t.active)
            .map(|t| (t.id, Score::default()))
            .collect::<HashMap<_, _>>();
        for (m, visibility) in self.matches(filter) {
            for (id, s) in match_team_scores(m, bye_score, visibility, filter) {
                if let Some(total) = board.get_mut(&id) {
                    *total = total.accumulate(&s);
                }
            }
        }
        board
    }

    /// Scores of all players on active teams.
    pub fn player_scoreboard(&self, filter: &Filter) -> HashMap<PlayerId, Score> {
        let bye_score = self.snapshot.tournament.bye_score;
        let active = self.snapshot.active_team_ids();
        let mut board = self
            .snapshot
            .players
            .iter()
            .filter(|p| p.team_id.map_or(false, |t| active.contains(&t)))
            .map(|p| (p.id, Score::default()))
            .collect::<HashMap<_, _>>();
        for (m, visibility) in self.matches(filter) {
            for (id, s) in match_player_scores(m, bye_score, visibility, filter) {
                if let Some(total) = board.get_mut(&id) {
                    *total = total.accumulate(&s);
                }
            }
        }
        board
    }

    pub fn team_standings(&self, filter: &Filter) -> Vec<Standing> {
        let board = self.team_scoreboard(filter);
        rank(self.snapshot.teams.iter().filter_map(|t| {
            board
                .get(&t.id)
                .map(|s| (t.id, t.name.clone(), s.clone()))
        }))
    }

    pub fn player_standings(&self, filter: &Filter) -> Vec<Standing> {
        let board = self.player_scoreboard(filter);
        let mut standings = rank(self.snapshot.players.iter().filter_map(|p| {
            board
                .get(&p.id)
                .map(|s| (p.id, p.name.clone(), s.clone()))
        }));
        if let Some(shown) = self.snapshot.tournament.shown_players {
            standings.truncate(shown as usize);
        }
        standings
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub id: i64,
    pub name: String,
    pub score: Score,
    pub rank: usize,
}

/// Best first. Entities with equal points share a rank and the next rank skips
/// accordingly (1, 1, 3); ties are listed by name.
pub fn rank(entries: impl IntoIterator<Item = (i64, String, Score)>) -> Vec<Standing> {
    let mut entries = entries.into_iter().collect::<Vec<_>>();
    entries.sort_by(|a, b| score::compare_points(&b.2, &a.2).then_with(|| a.1.cmp(&b.1)));
    let mut standings: Vec<Standing> = Vec::with_capacity(entries.len());
    for (i, (id, name, score)) in entries.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if score::compare_points(&prev.score, &score) == Ordering::Equal => prev.rank,
            _ => i + 1,
        };
        standings.push(Standing {
            id,
            name,
            score,
            rank,
        });
    }
    standings
}
