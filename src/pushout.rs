//! Configuration matcher - greedy detection of close instanton triples
//!
//! The scan is a density-priority greedy pass, not a maximum matching:
//!
//! 1. Build the full pairwise distance matrix over eligible instantons.
//! 2. Order instantons by ascending sum of distances to all others.
//! 3. For each unused instanton `i`, list unused neighbours within the
//!    threshold, nearest first.
//! 4. Take the first neighbour pair `(j, k)` (outer `j`, inner `k > j`) that
//!    is itself within the threshold; mark `i, j, k` used.
//!
//! Sorting is stable, so ties keep pool order and results are reproducible.

use crate::entity::{Composite, Instanton};
use crate::environment::Environment;
use crate::error::Result;
use crate::observer::SimEvent;
use crate::vector::Position;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Row-major `n x n` Euclidean distance matrix.
pub(crate) struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    #[cfg(not(feature = "parallel"))]
    pub(crate) fn new(positions: &[Position]) -> Self {
        let n = positions.len();
        let values = positions
            .iter()
            .flat_map(|a| positions.iter().map(move |b| a.distance(b)))
            .collect();
        Self { n, values }
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn new(positions: &[Position]) -> Self {
        let n = positions.len();
        let rows: Vec<Vec<f64>> = positions
            .par_iter()
            .map(|a| positions.iter().map(|b| a.distance(b)).collect())
            .collect();
        Self {
            n,
            values: rows.into_iter().flatten().collect(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub(crate) fn row_sum(&self, i: usize) -> f64 {
        self.values[i * self.n..(i + 1) * self.n].iter().sum()
    }
}

/// Greedy triple search. Returns index triples `[i, j, k]` into `positions`;
/// each index appears at most once.
pub fn find_triples(positions: &[Position], threshold: f64) -> Vec<[usize; 3]> {
    let n = positions.len();
    if n < 3 {
        return Vec::new();
    }
    let dist = DistanceMatrix::new(positions);

    let sums: Vec<f64> = (0..n).map(|i| dist.row_sum(i)).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| sums[a].total_cmp(&sums[b]));

    let mut used = vec![false; n];
    let mut triples = Vec::new();

    for &i in &order {
        if used[i] {
            continue;
        }
        let mut neighbors: Vec<usize> = (0..n)
            .filter(|&j| j != i && !used[j] && dist.get(i, j) <= threshold)
            .collect();
        neighbors.sort_by(|&a, &b| dist.get(i, a).total_cmp(&dist.get(i, b)));

        'scan: for (a, &j) in neighbors.iter().enumerate() {
            for &k in &neighbors[a + 1..] {
                if dist.get(j, k) <= threshold {
                    used[i] = true;
                    used[j] = true;
                    used[k] = true;
                    triples.push([i, j, k]);
                    break 'scan;
                }
            }
        }
    }

    triples
}

impl Environment {
    /// Scan unstabilized pool members for triples whose pairwise distances are
    /// all within `threshold`. The pool itself is not modified.
    pub fn match_configurations(&mut self, threshold: f64) -> Result<Vec<Composite>> {
        let eligible: Vec<&Instanton> = self.pool.iter().filter(|kq| !kq.is_stabilized()).collect();
        let positions: Vec<Position> = eligible.iter().map(|kq| *kq.position()).collect();
        let groups: Vec<Vec<Instanton>> = find_triples(&positions, threshold)
            .into_iter()
            .map(|t| t.iter().map(|&idx| eligible[idx].clone()).collect())
            .collect();

        let mut candidates = Vec::with_capacity(groups.len());
        for members in groups {
            candidates.push(Composite::new(members, self.current_time, &mut self.rng)?);
        }

        if !candidates.is_empty() {
            tracing::debug!(
                count = candidates.len(),
                t = self.current_time,
                "pushout candidates"
            );
            self.record(SimEvent::PushoutCandidates {
                count: candidates.len(),
            });
        }
        Ok(candidates)
    }
}
