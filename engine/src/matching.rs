//! Maximum weight matching in general graphs.
//!
//! Edmonds' blossom algorithm with dual variables, O(n^3). The matching always
//! has maximum cardinality; among those, maximum total weight. Weights may be
//! negative. All arithmetic is exact as long as the weight type is: only
//! additions, subtractions, comparisons and halving of provably even values
//! are performed.

use std::ops::{Add, Sub};

use num_bigint::BigInt;

use crate::{Error, Result};

pub trait Weight:
    Clone + Ord + Default + std::fmt::Debug + Add<Output = Self> + Sub<Output = Self>
{
    /// Only ever called on even values.
    fn halve(self) -> Self;
}

impl Weight for i64 {
    fn halve(self) -> Self {
        self / 2
    }
}

impl Weight for BigInt {
    fn halve(self) -> Self {
        self / 2u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<W> {
    pub u: usize,
    pub v: usize,
    pub weight: W,
}

impl<W> Edge<W> {
    pub fn new(u: usize, v: usize, weight: W) -> Self {
        Edge { u, v, weight }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matching {
    mate: Vec<Option<usize>>,
}

impl Matching {
    pub fn mate(&self, v: usize) -> Option<usize> {
        self.mate.get(v).copied().flatten()
    }

    /// Matched pairs as (u, v) with u < v, ordered by u.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.mate
            .iter()
            .enumerate()
            .filter_map(|(u, m)| m.filter(|v| u < *v).map(|v| (u, v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mate.iter().all(Option::is_none)
    }
}

pub fn max_weight_matching<W: Weight>(num_nodes: usize, edges: &[Edge<W>]) -> Result<Matching> {
    for e in edges.iter() {
        if e.u >= num_nodes || e.v >= num_nodes || e.u == e.v {
            return Err(Error::Validation(format!(
                "Edge {}-{} is not valid for a graph with {num_nodes} nodes",
                e.u, e.v
            )));
        }
    }
    if edges.is_empty() {
        return Ok(Matching {
            mate: vec![None; num_nodes],
        });
    }
    let mut m = Matcher::new(num_nodes, edges);
    m.run()?;
    let mate = m
        .mate
        .iter()
        .map(|p| p.map(|p| m.endpoint[p]))
        .collect();
    Ok(Matching { mate })
}

const FREE: u8 = 0;
const S: u8 = 1;
const T: u8 = 2;
const BREADCRUMB: u8 = 4;

enum Delta {
    // No further improvement possible.
    Done,
    // Edge from a free vertex to an S-vertex became tight.
    Grow(usize),
    // Edge between two S-blossoms became tight.
    Merge(usize),
    // Dual of a T-blossom dropped to zero.
    Expand(usize),
}

fn broken(what: &str) -> Error {
    Error::Computation(format!("Matching invariant violated: {what}"))
}

fn wrap(j: isize, len: usize) -> usize {
    j.rem_euclid(len as isize) as usize
}

/// Vertices are 0..n, non-trivial blossoms n..2n. Edge k has endpoints 2k
/// (its `u`) and 2k+1 (its `v`); `p ^ 1` is the opposite endpoint of `p`.
struct Matcher<'a, W> {
    n: usize,
    edges: &'a [Edge<W>],
    double_weight: Vec<W>,
    endpoint: Vec<usize>,
    // Remote endpoints of the edges incident to each vertex.
    neighbours: Vec<Vec<usize>>,
    // Remote endpoint of the matched edge.
    mate: Vec<Option<usize>>,
    label: Vec<u8>,
    // Endpoint through which a vertex or top-level blossom got its label.
    label_end: Vec<Option<usize>>,
    in_blossom: Vec<usize>,
    parent: Vec<Option<usize>>,
    // Sub-blossoms in cyclic order starting at the base; empty for unused blossoms.
    children: Vec<Vec<usize>>,
    // endpoints[b][i] connects children[b][i] and children[b][i + 1].
    endpoints: Vec<Vec<usize>>,
    base: Vec<usize>,
    best_edge: Vec<Option<usize>>,
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused: Vec<usize>,
    dual: Vec<W>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a, W: Weight> Matcher<'a, W> {
    fn new(n: usize, edges: &'a [Edge<W>]) -> Self {
        let max_weight = edges
            .iter()
            .map(|e| e.weight.clone())
            .max()
            .unwrap_or_default()
            .max(W::default());
        let mut neighbours = vec![vec![]; n];
        let mut endpoint = Vec::with_capacity(2 * edges.len());
        for (k, e) in edges.iter().enumerate() {
            endpoint.push(e.u);
            endpoint.push(e.v);
            neighbours[e.u].push(2 * k + 1);
            neighbours[e.v].push(2 * k);
        }
        let mut dual = vec![max_weight; n];
        dual.extend((0..n).map(|_| W::default()));
        Matcher {
            n,
            edges,
            double_weight: edges
                .iter()
                .map(|e| e.weight.clone() + e.weight.clone())
                .collect(),
            endpoint,
            neighbours,
            mate: vec![None; n],
            label: vec![FREE; 2 * n],
            label_end: vec![None; 2 * n],
            in_blossom: (0..n).collect(),
            parent: vec![None; 2 * n],
            children: vec![vec![]; 2 * n],
            endpoints: vec![vec![]; 2 * n],
            base: (0..2 * n).collect(),
            best_edge: vec![None; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused: (n..2 * n).collect(),
            dual,
            allow_edge: vec![false; edges.len()],
            queue: vec![],
        }
    }

    fn slack(&self, k: usize) -> W {
        let e = &self.edges[k];
        self.dual[e.u].clone() + self.dual[e.v].clone() - self.double_weight[k].clone()
    }

    fn is_live(&self, b: usize) -> bool {
        b < self.n || !self.children[b].is_empty()
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = vec![];
        self.collect_leaves(b, &mut out);
        out
    }

    fn collect_leaves(&self, b: usize, out: &mut Vec<usize>) {
        if b < self.n {
            out.push(b);
        } else {
            for &t in self.children[b].iter() {
                self.collect_leaves(t, out);
            }
        }
    }

    fn assign_label(&mut self, w: usize, t: u8, p: Option<usize>) -> Result<()> {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = None;
        self.best_edge[b] = None;
        if t == S {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == T {
            let base = self.base[b];
            let m = self.mate[base].ok_or_else(|| broken("T-blossom with a single base"))?;
            self.assign_label(self.endpoint[m], S, Some(m ^ 1))?;
        }
        Ok(())
    }

    /// Traces back from v and w towards the roots of their trees. Returns the
    /// base of the new blossom, or None if the paths reach different roots.
    fn scan_blossom(&mut self, v: usize, w: usize) -> Result<Option<usize>> {
        let mut path = vec![];
        let mut base = None;
        let (mut v, mut w) = (Some(v), Some(w));
        while let Some(cur) = v {
            let b = self.in_blossom[cur];
            if self.label[b] & BREADCRUMB != 0 {
                base = Some(self.base[b]);
                break;
            }
            path.push(b);
            self.label[b] = S | BREADCRUMB;
            v = match self.label_end[b] {
                None => None,
                Some(p) => {
                    let tb = self.in_blossom[self.endpoint[p]];
                    let tp = self.label_end[tb].ok_or_else(|| broken("unlabelled T-blossom"))?;
                    Some(self.endpoint[tp])
                }
            };
            if w.is_some() {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = S;
        }
        Ok(base)
    }

    fn add_blossom(&mut self, base: usize, k: usize) -> Result<()> {
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[self.edges[k].u];
        let mut bw = self.in_blossom[self.edges[k].v];
        let b = self.unused.pop().ok_or_else(|| broken("no free blossom slots"))?;
        self.base[b] = base;
        self.parent[b] = None;
        self.parent[bb] = Some(b);
        let mut path = vec![];
        let mut endps = vec![];
        while bv != bb {
            self.parent[bv] = Some(b);
            path.push(bv);
            let p = self.label_end[bv].ok_or_else(|| broken("unlabelled blossom on path"))?;
            endps.push(p);
            bv = self.in_blossom[self.endpoint[p]];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.parent[bw] = Some(b);
            path.push(bw);
            let p = self.label_end[bw].ok_or_else(|| broken("unlabelled blossom on path"))?;
            endps.push(p ^ 1);
            bw = self.in_blossom[self.endpoint[p]];
        }
        self.label[b] = S;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = W::default();
        self.children[b] = path.clone();
        self.endpoints[b] = endps;
        for leaf in self.leaves(b) {
            if self.label[self.in_blossom[leaf]] == T {
                // Former T-vertices become S-vertices.
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        let mut best_to: Vec<Option<usize>> = vec![None; 2 * self.n];
        for &sub in path.iter() {
            let lists: Vec<Vec<usize>> = match self.blossom_best_edges[sub].take() {
                Some(list) => vec![list],
                None => self
                    .leaves(sub)
                    .into_iter()
                    .map(|leaf| self.neighbours[leaf].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for k in lists.into_iter().flatten() {
                let e = &self.edges[k];
                let j = if self.in_blossom[e.v] == b { e.u } else { e.v };
                let bj = self.in_blossom[j];
                if bj != b
                    && self.label[bj] == S
                    && best_to[bj].map_or(true, |cur| self.slack(k) < self.slack(cur))
                {
                    best_to[bj] = Some(k);
                }
            }
            self.best_edge[sub] = None;
        }
        let best = best_to.into_iter().flatten().collect::<Vec<_>>();
        self.best_edge[b] = None;
        for &k in best.iter() {
            if self.best_edge[b].map_or(true, |cur| self.slack(k) < self.slack(cur)) {
                self.best_edge[b] = Some(k);
            }
        }
        self.blossom_best_edges[b] = Some(best);
        Ok(())
    }

    fn expand_blossom(&mut self, b: usize, end_stage: bool) -> Result<()> {
        let children = self.children[b].clone();
        let endps = self.endpoints[b].clone();
        for &s in children.iter() {
            self.parent[s] = None;
            if s < self.n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == W::default() {
                self.expand_blossom(s, end_stage)?;
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }
        if !end_stage && self.label[b] == T {
            // Relabel the sub-blossoms on the even-length path from the entry
            // child to the base; the rest become free or keep their labels.
            let len = children.len();
            let entry_end = self.label_end[b].ok_or_else(|| broken("unlabelled T-blossom"))?;
            let entry = self.in_blossom[self.endpoint[entry_end ^ 1]];
            let pos = children
                .iter()
                .position(|&c| c == entry)
                .ok_or_else(|| broken("entry child not in blossom"))?;
            let mut j = pos as isize;
            let (step, trick): (isize, usize) = if pos & 1 == 1 {
                j -= len as isize;
                (1, 0)
            } else {
                (-1, 1)
            };
            let mut p = entry_end;
            while j != 0 {
                self.label[self.endpoint[p ^ 1]] = FREE;
                let q = endps[wrap(j - trick as isize, len)];
                self.label[self.endpoint[q ^ trick ^ 1]] = FREE;
                self.assign_label(self.endpoint[p ^ 1], T, Some(p))?;
                self.allow_edge[q / 2] = true;
                j += step;
                p = endps[wrap(j - trick as isize, len)] ^ trick;
                self.allow_edge[p / 2] = true;
                j += step;
            }
            let bv = children[wrap(j, len)];
            let ep = self.endpoint[p ^ 1];
            self.label[ep] = T;
            self.label[bv] = T;
            self.label_end[ep] = Some(p);
            self.label_end[bv] = Some(p);
            self.best_edge[bv] = None;
            j += step;
            while children[wrap(j, len)] != entry {
                let bv = children[wrap(j, len)];
                if self.label[bv] == S {
                    j += step;
                    continue;
                }
                let reached = self
                    .leaves(bv)
                    .into_iter()
                    .find(|&v| self.label[v] != FREE);
                if let Some(v) = reached {
                    self.label[v] = FREE;
                    let m = self.mate[self.base[bv]]
                        .ok_or_else(|| broken("sub-blossom base is single"))?;
                    self.label[self.endpoint[m]] = FREE;
                    let end = self.label_end[v];
                    self.assign_label(v, T, end)?;
                }
                j += step;
            }
        }
        self.label[b] = FREE;
        self.label_end[b] = None;
        self.children[b].clear();
        self.endpoints[b].clear();
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = None;
        self.unused.push(b);
        Ok(())
    }

    /// Swaps matched and unmatched edges on the path from v to the base of b.
    fn augment_blossom(&mut self, b: usize, v: usize) -> Result<()> {
        let mut t = v;
        while self.parent[t] != Some(b) {
            t = self.parent[t].ok_or_else(|| broken("vertex outside of blossom"))?;
        }
        if t >= self.n {
            self.augment_blossom(t, v)?;
        }
        let children = self.children[b].clone();
        let endps = self.endpoints[b].clone();
        let len = children.len();
        let i = children
            .iter()
            .position(|&c| c == t)
            .ok_or_else(|| broken("child not in blossom"))?;
        let mut j = i as isize;
        let (step, trick): (isize, usize) = if i & 1 == 1 {
            j -= len as isize;
            (1, 0)
        } else {
            (-1, 1)
        };
        while j != 0 {
            j += step;
            let t = children[wrap(j, len)];
            let p = endps[wrap(j - trick as isize, len)] ^ trick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p])?;
            }
            j += step;
            let t = children[wrap(j, len)];
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1])?;
            }
            self.mate[self.endpoint[p]] = Some(p ^ 1);
            self.mate[self.endpoint[p ^ 1]] = Some(p);
        }
        self.children[b].rotate_left(i);
        self.endpoints[b].rotate_left(i);
        self.base[b] = self.base[self.children[b][0]];
        Ok(())
    }

    fn augment_matching(&mut self, k: usize) -> Result<()> {
        let e = &self.edges[k];
        for (start, start_p) in [(e.u, 2 * k + 1), (e.v, 2 * k)] {
            let (mut s, mut p) = (start, start_p);
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.n {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = Some(p);
                let Some(end) = self.label_end[bs] else {
                    // Reached a single vertex at the root.
                    break;
                };
                let t = self.endpoint[end];
                let bt = self.in_blossom[t];
                let t_end = self.label_end[bt].ok_or_else(|| broken("unlabelled T-blossom"))?;
                s = self.endpoint[t_end];
                let j = self.endpoint[t_end ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = Some(t_end);
                p = t_end ^ 1;
            }
        }
        Ok(())
    }

    fn scan_queue(&mut self) -> Result<bool> {
        while let Some(v) = self.queue.pop() {
            for idx in 0..self.neighbours[v].len() {
                let p = self.neighbours[v][idx];
                let k = p / 2;
                let w = self.endpoint[p];
                if self.in_blossom[v] == self.in_blossom[w] {
                    continue;
                }
                let mut k_slack = None;
                if !self.allow_edge[k] {
                    let slack = self.slack(k);
                    if slack <= W::default() {
                        self.allow_edge[k] = true;
                    }
                    k_slack = Some(slack);
                }
                if self.allow_edge[k] {
                    match self.label[self.in_blossom[w]] {
                        FREE => self.assign_label(w, T, Some(p ^ 1))?,
                        S => match self.scan_blossom(v, w)? {
                            Some(base) => self.add_blossom(base, k)?,
                            None => {
                                self.augment_matching(k)?;
                                return Ok(true);
                            }
                        },
                        _ => {
                            if self.label[w] == FREE {
                                self.label[w] = T;
                                self.label_end[w] = Some(p ^ 1);
                            }
                        }
                    }
                    continue;
                }
                let slack = k_slack.unwrap_or_else(|| self.slack(k));
                if self.label[self.in_blossom[w]] == S {
                    let b = self.in_blossom[v];
                    if self.best_edge[b].map_or(true, |cur| slack < self.slack(cur)) {
                        self.best_edge[b] = Some(k);
                    }
                } else if self.label[w] == FREE
                    && self.best_edge[w].map_or(true, |cur| slack < self.slack(cur))
                {
                    self.best_edge[w] = Some(k);
                }
            }
        }
        Ok(false)
    }

    fn choose_delta(&self) -> (W, Delta) {
        let n = self.n;
        let mut best: Option<(W, Delta)> = None;
        let better = |best: &Option<(W, Delta)>, d: &W| best.as_ref().map_or(true, |(cur, _)| d < cur);
        for v in 0..n {
            if self.label[self.in_blossom[v]] != FREE {
                continue;
            }
            if let Some(k) = self.best_edge[v] {
                let d = self.slack(k);
                if better(&best, &d) {
                    best = Some((d, Delta::Grow(k)));
                }
            }
        }
        for b in 0..2 * n {
            if self.parent[b].is_some() || self.label[b] != S {
                continue;
            }
            if let Some(k) = self.best_edge[b] {
                let d = self.slack(k).halve();
                if better(&best, &d) {
                    best = Some((d, Delta::Merge(k)));
                }
            }
        }
        for b in n..2 * n {
            if self.is_live(b)
                && self.parent[b].is_none()
                && self.label[b] == T
                && better(&best, &self.dual[b])
            {
                best = Some((self.dual[b].clone(), Delta::Expand(b)));
            }
        }
        best.unwrap_or_else(|| {
            let min_dual = self.dual[..n].iter().min().cloned().unwrap_or_default();
            (min_dual.max(W::default()), Delta::Done)
        })
    }

    fn apply_delta(&mut self, delta: &W) {
        let n = self.n;
        for v in 0..n {
            match self.label[self.in_blossom[v]] {
                S => self.dual[v] = self.dual[v].clone() - delta.clone(),
                T => self.dual[v] = self.dual[v].clone() + delta.clone(),
                _ => {}
            }
        }
        for b in n..2 * n {
            if !self.is_live(b) || self.parent[b].is_some() {
                continue;
            }
            match self.label[b] {
                S => self.dual[b] = self.dual[b].clone() + delta.clone(),
                T => self.dual[b] = self.dual[b].clone() - delta.clone(),
                _ => {}
            }
        }
    }

    fn run(&mut self) -> Result<()> {
        let n = self.n;
        // Each stage either augments the matching by one edge or terminates.
        for _ in 0..n {
            self.label.fill(FREE);
            self.best_edge.fill(None);
            for b in n..2 * n {
                self.blossom_best_edges[b] = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();
            for v in 0..n {
                if self.mate[v].is_none() && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, S, None)?;
                }
            }
            let mut augmented = false;
            loop {
                if self.scan_queue()? {
                    augmented = true;
                    break;
                }
                let (delta, kind) = self.choose_delta();
                self.apply_delta(&delta);
                match kind {
                    Delta::Done => break,
                    Delta::Grow(k) => {
                        self.allow_edge[k] = true;
                        let e = &self.edges[k];
                        let i = if self.label[self.in_blossom[e.u]] == FREE {
                            e.v
                        } else {
                            e.u
                        };
                        self.queue.push(i);
                    }
                    Delta::Merge(k) => {
                        self.allow_edge[k] = true;
                        self.queue.push(self.edges[k].u);
                    }
                    Delta::Expand(b) => self.expand_blossom(b, false)?,
                }
            }
            if !augmented {
                break;
            }
            for b in n..2 * n {
                if self.parent[b].is_none()
                    && self.is_live(b)
                    && self.label[b] == S
                    && self.dual[b] == W::default()
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn run(edges: &[(usize, usize, i64)]) -> Vec<Option<usize>> {
        let n = edges
            .iter()
            .map(|(u, v, _)| u.max(v) + 1)
            .max()
            .unwrap_or_default();
        let edges = edges
            .iter()
            .map(|&(u, v, w)| Edge::new(u, v, w))
            .collect::<Vec<_>>();
        let m = max_weight_matching(n, &edges).expect("matching failed");
        (0..n).map(|v| m.mate(v)).collect()
    }

    fn mates(m: &[i64]) -> Vec<Option<usize>> {
        m.iter()
            .map(|&x| if x < 0 { None } else { Some(x as usize) })
            .collect()
    }

    #[test]
    fn test_trivial() {
        let m = max_weight_matching::<i64>(3, &[]).unwrap();
        assert!(m.is_empty());
        assert_eq!(run(&[(0, 1, 1)]), mates(&[1, 0]));
        assert_eq!(run(&[(1, 2, 10), (2, 3, 11)]), mates(&[-1, -1, 3, 2]));
    }

    #[test]
    fn test_invalid_edge() {
        let edges = [Edge::new(0, 0, 1i64)];
        assert!(matches!(
            max_weight_matching(2, &edges),
            Err(Error::Validation(_))
        ));
        let edges = [Edge::new(0, 5, 1i64)];
        assert!(max_weight_matching(2, &edges).is_err());
    }

    #[test]
    fn test_cardinality_before_weight() {
        assert_eq!(
            run(&[(1, 2, 5), (2, 3, 11), (3, 4, 5)]),
            mates(&[-1, 2, 1, 4, 3])
        );
        assert_eq!(
            run(&[(1, 2, 2), (1, 3, -2), (2, 3, 1), (2, 4, -1), (3, 4, -6)]),
            mates(&[-1, 3, 4, 1, 2])
        );
    }

    #[test]
    fn test_s_blossom() {
        assert_eq!(
            run(&[(1, 2, 8), (1, 3, 9), (2, 3, 10), (3, 4, 7)]),
            mates(&[-1, 2, 1, 4, 3])
        );
        assert_eq!(
            run(&[(1, 2, 8), (1, 3, 9), (2, 3, 10), (3, 4, 7), (1, 6, 5), (4, 5, 6)]),
            mates(&[-1, 6, 3, 2, 5, 4, 1])
        );
    }

    #[test]
    fn test_t_blossom() {
        assert_eq!(
            run(&[(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 4), (1, 6, 3)]),
            mates(&[-1, 6, 3, 2, 5, 4, 1])
        );
        assert_eq!(
            run(&[(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 3), (1, 6, 4)]),
            mates(&[-1, 6, 3, 2, 5, 4, 1])
        );
        assert_eq!(
            run(&[(1, 2, 9), (1, 3, 8), (2, 3, 10), (1, 4, 5), (4, 5, 3), (3, 6, 4)]),
            mates(&[-1, 2, 1, 6, 5, 4, 3])
        );
    }

    #[test]
    fn test_nested_blossoms() {
        assert_eq!(
            run(&[(1, 2, 9), (1, 3, 9), (2, 3, 10), (2, 4, 8), (3, 5, 8), (4, 5, 10), (5, 6, 6)]),
            mates(&[-1, 3, 4, 1, 2, 6, 5])
        );
        assert_eq!(
            run(&[
                (1, 2, 10),
                (1, 7, 10),
                (2, 3, 12),
                (3, 4, 20),
                (3, 5, 20),
                (4, 5, 25),
                (5, 6, 10),
                (6, 7, 10),
                (7, 8, 8)
            ]),
            mates(&[-1, 2, 1, 4, 3, 6, 5, 8, 7])
        );
        assert_eq!(
            run(&[
                (1, 2, 8),
                (1, 3, 8),
                (2, 3, 10),
                (2, 4, 12),
                (3, 5, 12),
                (4, 5, 14),
                (4, 6, 12),
                (5, 7, 12),
                (6, 7, 14),
                (7, 8, 12)
            ]),
            mates(&[-1, 2, 1, 5, 6, 3, 4, 8, 7])
        );
    }

    #[test]
    fn test_blossom_expansion() {
        assert_eq!(
            run(&[
                (1, 2, 23),
                (1, 5, 22),
                (1, 6, 15),
                (2, 3, 25),
                (3, 4, 22),
                (4, 5, 25),
                (4, 8, 14),
                (5, 7, 13)
            ]),
            mates(&[-1, 6, 3, 2, 8, 7, 1, 5, 4])
        );
        assert_eq!(
            run(&[
                (1, 2, 19),
                (1, 3, 20),
                (1, 8, 8),
                (2, 3, 25),
                (2, 4, 18),
                (3, 5, 18),
                (4, 5, 13),
                (4, 7, 7),
                (5, 6, 7)
            ]),
            mates(&[-1, 8, 3, 2, 7, 6, 5, 4, 1])
        );
        for (w48, w57) in [(35, 26), (26, 40), (28, 26)] {
            assert_eq!(
                run(&[
                    (1, 2, 45),
                    (1, 5, 45),
                    (2, 3, 50),
                    (3, 4, 45),
                    (4, 5, 50),
                    (1, 6, 30),
                    (3, 9, 35),
                    (4, 8, w48),
                    (5, 7, w57),
                    (9, 10, 5)
                ]),
                mates(&[-1, 6, 3, 2, 8, 7, 1, 5, 4, 10, 9]),
                "w48={w48}"
            );
        }
        assert_eq!(
            run(&[
                (1, 2, 45),
                (1, 7, 45),
                (2, 3, 50),
                (3, 4, 45),
                (4, 5, 95),
                (4, 6, 94),
                (5, 6, 94),
                (6, 7, 50),
                (1, 8, 30),
                (3, 11, 35),
                (5, 9, 36),
                (7, 10, 26),
                (11, 12, 5)
            ]),
            mates(&[-1, 8, 3, 2, 6, 9, 4, 10, 1, 5, 7, 12, 11])
        );
        assert_eq!(
            run(&[
                (1, 2, 40),
                (1, 3, 40),
                (2, 3, 60),
                (2, 4, 55),
                (3, 5, 55),
                (4, 5, 50),
                (1, 8, 15),
                (5, 7, 30),
                (7, 6, 10),
                (8, 10, 10),
                (4, 9, 30)
            ]),
            mates(&[-1, 2, 1, 5, 9, 3, 7, 6, 10, 4, 8])
        );
    }

    #[test]
    fn test_big_weights() {
        let big = BigInt::from(10).pow(60);
        let edges = vec![
            Edge::new(0, 1, -big.clone()),
            Edge::new(2, 3, -big.clone()),
            Edge::new(0, 2, -(big.clone() + BigInt::from(1))),
            Edge::new(1, 3, BigInt::from(0)),
        ];
        let m = max_weight_matching(4, &edges).unwrap();
        assert_eq!(m.pairs(), vec![(0, 2), (1, 3)]);
    }

    // Exhaustive reference: best (cardinality, weight) over all matchings.
    fn brute_force(n: usize, weights: &[Vec<Option<i64>>], used: &mut Vec<bool>) -> (usize, i64) {
        let Some(i) = (0..n).find(|&i| !used[i]) else {
            return (0, 0);
        };
        used[i] = true;
        let mut best = brute_force(n, weights, used);
        for j in i + 1..n {
            if used[j] {
                continue;
            }
            if let Some(w) = weights[i][j] {
                used[j] = true;
                let (c, s) = brute_force(n, weights, used);
                used[j] = false;
                best = best.max((c + 1, s + w));
            }
        }
        used[i] = false;
        best
    }

    #[test]
    fn test_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for iter in 0..300 {
            let n = rng.gen_range(2..=9);
            let mut weights = vec![vec![None; n]; n];
            let mut edges = vec![];
            for i in 0..n {
                for j in i + 1..n {
                    if rng.gen_bool(0.5) {
                        let w = rng.gen_range(-20..=40);
                        weights[i][j] = Some(w);
                        edges.push(Edge::new(i, j, w));
                    }
                }
            }
            let m = max_weight_matching(n, &edges).unwrap();
            let mut total = 0;
            for (u, v) in m.pairs() {
                total += weights[u][v].expect("matched a non-edge");
                assert_eq!(m.mate(v), Some(u));
            }
            let expected = brute_force(n, &weights, &mut vec![false; n]);
            assert_eq!((m.len(), total), expected, "iteration {iter}: {edges:?}");
        }
    }
}
