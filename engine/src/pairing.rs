use std::collections::{BTreeSet, HashMap, HashSet};

use num_bigint::BigInt;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::matching::{max_weight_matching, Edge};
use crate::model::{pair_key, Snapshot, TeamId};
use crate::score::Score;
use crate::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<(TeamId, TeamId)>,
    pub bye: Option<TeamId>,
    // Teams no repeat-free matching could place.
    pub unpaired: Vec<TeamId>,
}

impl Pairing {
    pub fn num_placed(&self) -> usize {
        2 * self.pairs.len() + usize::from(self.bye.is_some())
    }
}

/// Who played whom and who sat out, as far as pairing is concerned.
#[derive(Clone, Debug, Default)]
pub struct History {
    pub previous_pairs: HashSet<(TeamId, TeamId)>,
    pub bye_counts: HashMap<TeamId, usize>,
}

impl History {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        History {
            previous_pairs: snapshot.previous_pairs(),
            bye_counts: snapshot.bye_counts(),
        }
    }

    pub fn played(&self, a: TeamId, b: TeamId) -> bool {
        self.previous_pairs.contains(&pair_key(a, b))
    }

    /// Teams with the fewest byes so far. Nobody gets a second bye before
    /// every team has had one.
    pub fn bye_candidates(&self, teams: &[TeamId]) -> HashSet<TeamId> {
        let count = |id: &TeamId| self.bye_counts.get(id).copied().unwrap_or_default();
        let fewest = teams.iter().map(count).min().unwrap_or_default();
        teams
            .iter()
            .filter(|id| count(id) == fewest)
            .copied()
            .collect()
    }
}

/// Random pairing of the first round. With an odd number of teams the last
/// one left gets the bye.
pub fn first_round<R: Rng + ?Sized>(teams: &[TeamId], rng: &mut R) -> Pairing {
    let mut shuffled = teams.to_vec();
    shuffled.shuffle(rng);
    let mut pairing = Pairing::default();
    for chunk in shuffled.chunks(2) {
        match *chunk {
            [a, b] => pairing.pairs.push((a, b)),
            [a] => pairing.bye = Some(a),
            _ => {}
        }
    }
    pairing
}

/// Pairs teams with the closest scores without repeating a previous pairing.
///
/// Edge weights are `-gap * M^pos` where `pos` is the rank of the higher of
/// the two scores among distinct scores and `M` exceeds any sum of lower
/// order terms, so decisions in higher score clusters always dominate.
/// The optional bye node prefers the lowest-scoring eligible team.
pub fn next_round(
    teams: &[TeamId],
    scoreboard: &HashMap<TeamId, Score>,
    history: &History,
) -> Result<Pairing> {
    let n = teams.len();
    if n == 0 {
        return Ok(Pairing::default());
    }
    let scores = teams
        .iter()
        .map(|id| scoreboard.get(id).cloned().unwrap_or_default().to_int())
        .collect::<Result<Vec<i64>>>()?;
    let distinct = scores.iter().copied().collect::<BTreeSet<_>>();
    let pos = distinct
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i))
        .collect::<HashMap<_, _>>();
    let (min, max) = match (distinct.first(), distinct.last()) {
        (Some(min), Some(max)) => (BigInt::from(*min), BigInt::from(*max)),
        _ => return Ok(Pairing::default()),
    };
    let base: BigInt = BigInt::from(n) * (max - min) + 1;
    let powers = (0..distinct.len())
        .map(|p| base.pow(p as u32))
        .collect::<Vec<_>>();

    let mut edges = vec![];
    for i in 0..n {
        for j in i + 1..n {
            if history.played(teams[i], teams[j]) {
                continue;
            }
            let (lo, hi) = if scores[i] <= scores[j] {
                (scores[i], scores[j])
            } else {
                (scores[j], scores[i])
            };
            let gap = BigInt::from(hi) - BigInt::from(lo);
            edges.push(Edge::new(i, j, -(gap * &powers[pos[&hi]])));
        }
    }
    let bye_node = (n % 2 == 1).then_some(n);
    if let Some(bye_node) = bye_node {
        let candidates = history.bye_candidates(teams);
        let top = &powers[distinct.len() - 1];
        for (i, id) in teams.iter().enumerate() {
            if candidates.contains(id) {
                edges.push(Edge::new(i, bye_node, -(BigInt::from(scores[i]) * top)));
            }
        }
    }

    let matching = max_weight_matching(n + usize::from(bye_node.is_some()), &edges)?;
    let mut pairing = Pairing::default();
    for (u, v) in matching.pairs() {
        if v == n {
            pairing.bye = Some(teams[u]);
        } else {
            pairing.pairs.push((teams[u], teams[v]));
        }
    }
    pairing.unpaired = (0..n)
        .filter(|&i| matching.mate(i).is_none())
        .map(|i| teams[i])
        .collect();
    if !pairing.unpaired.is_empty() {
        log::warn!(
            "No repeat-free pairing for teams {:?}",
            pairing.unpaired
        );
    }
    Ok(pairing)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::MatchType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    fn points(primary: i64) -> Score {
        Score::single(Decimal::from(primary), Decimal::ZERO, MatchType::Normal)
    }

    fn history(pairs: &[(TeamId, TeamId)], byes: &[TeamId]) -> History {
        let mut h = History {
            previous_pairs: pairs.iter().map(|&(a, b)| pair_key(a, b)).collect(),
            ..Default::default()
        };
        for id in byes {
            *h.bye_counts.entry(*id).or_default() += 1;
        }
        h
    }

    fn all_teams(p: &Pairing) -> Vec<TeamId> {
        let mut ids = p
            .pairs
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .chain(p.bye)
            .chain(p.unpaired.iter().copied())
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    #[test]
    fn test_first_round_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = first_round(&[1, 2, 3, 4], &mut rng);
        assert_eq!(p.pairs.len(), 2);
        assert_eq!(p.bye, None);
        assert_eq!(all_teams(&p), vec![1, 2, 3, 4]);
        let p = first_round(&[1, 2, 3, 4, 5], &mut rng);
        assert_eq!(p.pairs.len(), 2);
        assert!(p.bye.is_some());
        assert_eq!(p.num_placed(), 5);
        assert_eq!(all_teams(&p), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_first_round_is_reproducible() {
        let teams = (1..=10).collect::<Vec<_>>();
        let a = first_round(&teams, &mut StdRng::seed_from_u64(42));
        let b = first_round(&teams, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_repeats() {
        let teams = [1, 2, 3, 4];
        let h = history(&[(1, 3), (2, 4)], &[]);
        let p = next_round(&teams, &HashMap::new(), &h).unwrap();
        assert_eq!(p.pairs.len(), 2);
        for &(a, b) in p.pairs.iter() {
            assert!(!h.played(a, b), "{a} and {b} met before");
        }
        assert!(p.unpaired.is_empty());
    }

    #[test]
    fn test_close_scores_are_paired() {
        let teams = [1, 2, 3, 4, 5, 6];
        let scoreboard = HashMap::from([
            (1, points(2)),
            (2, points(0)),
            (3, points(2)),
            (4, points(1)),
            (5, points(0)),
            (6, points(1)),
        ]);
        let p = next_round(&teams, &scoreboard, &History::default()).unwrap();
        let mut pairs = p.pairs.iter().map(|&(a, b)| pair_key(a, b)).collect::<Vec<_>>();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 3), (2, 5), (4, 6)]);
    }

    #[test]
    fn test_top_cluster_decided_first() {
        // The two leaders already met. Both candidate pairings have the same
        // total gap, but the smaller gap for the leader wins.
        let teams = [1, 2, 3, 4];
        let scoreboard = HashMap::from([
            (1, points(4)),
            (2, points(3)),
            (3, points(1)),
            (4, points(0)),
        ]);
        let h = history(&[(1, 2)], &[]);
        let p = next_round(&teams, &scoreboard, &h).unwrap();
        let mut pairs = p.pairs.iter().map(|&(a, b)| pair_key(a, b)).collect::<Vec<_>>();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 3), (2, 4)]);
    }

    #[test]
    fn test_bye_goes_to_lowest_eligible() {
        let teams = [1, 2, 3, 4, 5];
        let scoreboard = HashMap::from([
            (1, points(3)),
            (2, points(2)),
            (3, points(2)),
            (4, points(1)),
            (5, points(0)),
        ]);
        let p = next_round(&teams, &scoreboard, &History::default()).unwrap();
        assert_eq!(p.bye, Some(5));
        let p = next_round(&teams, &scoreboard, &history(&[], &[5])).unwrap();
        assert_eq!(p.bye, Some(4));
        assert_eq!(p.pairs.len(), 2);
    }

    #[test]
    fn test_second_bye_only_after_everyone() {
        let teams = [1, 2, 3, 4, 5];
        let h = history(&[], &[5]);
        assert_eq!(h.bye_candidates(&teams), HashSet::from([1, 2, 3, 4]));
        let h = history(&[], &[1, 2, 3, 4, 5]);
        assert_eq!(h.bye_candidates(&teams).len(), 5);
        let h = history(&[], &[1, 2, 3, 4, 5, 2]);
        assert!(!h.bye_candidates(&teams).contains(&2));
    }

    #[test]
    fn test_exhausted_pairs_are_reported() {
        let teams = [1, 2];
        let p = next_round(&teams, &HashMap::new(), &history(&[(1, 2)], &[])).unwrap();
        assert!(p.pairs.is_empty());
        assert_eq!(p.unpaired, vec![1, 2]);
        assert_eq!(p.num_placed(), 0);
    }

    #[test]
    fn test_many_clusters() {
        // Enough distinct scores to overflow any machine integer weight.
        let teams = (1..=40).collect::<Vec<_>>();
        let scoreboard = teams
            .iter()
            .map(|&id| (id, points(id * 7)))
            .collect::<HashMap<_, _>>();
        let p = next_round(&teams, &scoreboard, &History::default()).unwrap();
        assert_eq!(p.pairs.len(), 20);
        let mut pairs = p.pairs.iter().map(|&(a, b)| pair_key(a, b)).collect::<Vec<_>>();
        pairs.sort();
        let expected = (0..20).map(|i| (2 * i + 1, 2 * i + 2)).collect::<Vec<_>>();
        assert_eq!(pairs, expected);
    }
}
