//! Coverage and distance-to-target scoring over a [`ControlFlowGraph`].
//!
//! These are the fitness primitives behind the power schedule: every past
//! execution is scored by how much new coverage it added
//! ([`compute_delta_coverage`]) and by how much closer it brought the task to
//! the critical instructions ([`compute_delta_min_distance`]).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::{cfg::ControlFlowGraph, constants::INFINITE_DISTANCE};

/// For every block, the BFS distance to every target block (a block holding at
/// least one critical instruction). Unreachable targets are
/// [`INFINITE_DISTANCE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMap {
    targets: Vec<String>,
    distances: BTreeMap<String, BTreeMap<String, u64>>,
}

impl DistanceMap {
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Distance row of `source`, `None` for PCs that are not blocks.
    pub fn row(&self, source: &str) -> Option<&BTreeMap<String, u64>> {
        self.distances.get(source)
    }

    pub fn distance(&self, source: &str, target: &str) -> Option<u64> {
        self.row(source)?.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Computes the [`DistanceMap`] of `cfg` towards the blocks containing any of
/// `critical_instructions`.
///
/// One BFS per target over the reversed graph, `O(targets * (V + E))`.
pub fn compute_distance_map(
    cfg: &ControlFlowGraph,
    critical_instructions: &HashSet<String>,
) -> DistanceMap {
    let targets: Vec<String> = cfg
        .nodes()
        .iter()
        .filter(|(_, block)| {
            block
                .instructions
                .iter()
                .any(|pc| critical_instructions.contains(pc))
        })
        .map(|(pc, _)| pc.clone())
        .collect();

    let mut distances: BTreeMap<String, BTreeMap<String, u64>> = cfg
        .nodes()
        .keys()
        .map(|pc| {
            let row = targets
                .iter()
                .map(|t| (t.clone(), INFINITE_DISTANCE))
                .collect();
            (pc.clone(), row)
        })
        .collect();

    let reversed = cfg.reversed();
    for target in &targets {
        let mut seen: HashSet<&str> = HashSet::from([target.as_str()]);
        let mut queue: VecDeque<(&str, u64)> = VecDeque::from([(target.as_str(), 0)]);
        while let Some((node, level)) = queue.pop_front() {
            if let Some(d) = distances.get_mut(node).and_then(|row| row.get_mut(target)) {
                *d = level;
            }
            for &pred in reversed.get(node).into_iter().flatten() {
                if seen.insert(pred) {
                    queue.push_back((pred, level + 1));
                }
            }
        }
    }

    DistanceMap { targets, distances }
}

/// Number of blocks whose entry PC appears in `executed`.
pub fn compute_coverage(cfg: &ControlFlowGraph, executed: &HashSet<String>) -> u64 {
    cfg.nodes().keys().filter(|pc| executed.contains(*pc)).count() as u64
}

/// Coverage gained by adding `tx` to `cumulative`, never negative.
pub fn compute_delta_coverage(
    cfg: &ControlFlowGraph,
    tx: &HashSet<String>,
    cumulative: &HashSet<String>,
) -> u64 {
    let merged: HashSet<String> = cumulative.union(tx).cloned().collect();
    compute_coverage(cfg, &merged).saturating_sub(compute_coverage(cfg, cumulative))
}

/// Sum over all targets of the smallest distance from any executed block.
///
/// An empty execution has no defined distance and yields
/// [`INFINITE_DISTANCE`]; so does any execution that cannot reach some target.
pub fn compute_min_distance(map: &DistanceMap, executed: &HashSet<String>) -> u64 {
    if executed.is_empty() {
        return INFINITE_DISTANCE;
    }
    let mut minima: BTreeMap<&str, u64> = map
        .targets()
        .iter()
        .map(|t| (t.as_str(), INFINITE_DISTANCE))
        .collect();
    for row in executed.iter().filter_map(|pc| map.row(pc)) {
        for (target, &d) in row {
            if let Some(min) = minima.get_mut(target.as_str()) {
                *min = (*min).min(d);
            }
        }
    }
    minima
        .values()
        .fold(0u64, |acc, &d| acc.saturating_add(d))
}

/// How much closer `tx` brought the task to its targets.
///
/// With no prior execution the baseline is undefined, so the first
/// measurement is the absolute minimum distance of `cumulative ∪ tx`.
pub fn compute_delta_min_distance(
    map: &DistanceMap,
    tx: &HashSet<String>,
    cumulative: &HashSet<String>,
) -> u64 {
    let merged: HashSet<String> = cumulative.union(tx).cloned().collect();
    let after = compute_min_distance(map, &merged);
    let before = compute_min_distance(map, cumulative);
    if before == INFINITE_DISTANCE {
        return after;
    }
    before.saturating_sub(after)
}

/// Fitness of one execution against the task state at the time it ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fitness {
    pub delta_coverage: u64,
    pub delta_min_distance: u64,
}

/// Scores a task's executions one after another against a growing
/// cumulative instruction set.
#[derive(Debug, Clone)]
pub struct FitnessTracker {
    cfg: ControlFlowGraph,
    distances: DistanceMap,
    cumulative: HashSet<String>,
}

impl FitnessTracker {
    pub fn new(cfg: ControlFlowGraph, critical_instructions: &HashSet<String>) -> Self {
        let distances = compute_distance_map(&cfg, critical_instructions);
        Self::with_distance_map(cfg, distances)
    }

    /// Reuses a distance map computed earlier for the same contract.
    pub fn with_distance_map(cfg: ControlFlowGraph, distances: DistanceMap) -> Self {
        Self {
            cfg,
            distances,
            cumulative: HashSet::new(),
        }
    }

    pub fn distance_map(&self) -> &DistanceMap {
        &self.distances
    }

    pub fn cumulative(&self) -> &HashSet<String> {
        &self.cumulative
    }

    pub fn coverage(&self) -> u64 {
        compute_coverage(&self.cfg, &self.cumulative)
    }

    pub fn min_distance(&self) -> u64 {
        compute_min_distance(&self.distances, &self.cumulative)
    }

    /// Scores `tx` and then merges it into the cumulative set.
    pub fn record<I, S>(&mut self, tx: I) -> Fitness
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tx: HashSet<String> = tx.into_iter().map(Into::into).collect();
        let fitness = Fitness {
            delta_coverage: compute_delta_coverage(&self.cfg, &tx, &self.cumulative),
            delta_min_distance: compute_delta_min_distance(&self.distances, &tx, &self.cumulative),
        };
        self.cumulative.extend(tx);
        fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pcs: &[&str]) -> HashSet<String> {
        pcs.iter().map(|s| s.to_string()).collect()
    }

    /// A -> B -> T, C -> A, D isolated, T -> E.
    fn chain() -> ControlFlowGraph {
        ControlFlowGraph::new()
            .with_block("A", ["B"], ["A", "A1"])
            .with_block("B", ["T"], ["B", "B1", "B2"])
            .with_block("T", ["E"], ["T", "T1"])
            .with_block("C", ["A"], ["C"])
            .with_block("D", Vec::<String>::new(), ["D"])
            .with_block("E", Vec::<String>::new(), ["E"])
    }

    #[test]
    fn chain_distances() {
        let map = compute_distance_map(&chain(), &set(&["T1"]));
        assert_eq!(map.targets(), &["T".to_string()]);
        assert_eq!(map.distance("A", "T"), Some(2));
        assert_eq!(map.distance("B", "T"), Some(1));
        assert_eq!(map.distance("T", "T"), Some(0));
        assert_eq!(map.distance("C", "T"), Some(3));
        assert_eq!(map.distance("D", "T"), Some(INFINITE_DISTANCE));
        assert_eq!(map.distance("E", "T"), Some(INFINITE_DISTANCE));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn cycles_keep_shortest_distance() {
        let cfg = ControlFlowGraph::new()
            .with_block("A", ["B", "T"], ["A"])
            .with_block("B", ["A"], ["B"])
            .with_block("T", ["A"], ["T", "X"]);
        let map = compute_distance_map(&cfg, &set(&["X"]));
        assert_eq!(map.distance("A", "T"), Some(1));
        assert_eq!(map.distance("B", "T"), Some(2));
        assert_eq!(map.distance("T", "T"), Some(0));
    }

    #[test]
    fn no_critical_instructions_gives_empty_rows() {
        let map = compute_distance_map(&chain(), &HashSet::new());
        assert!(map.targets().is_empty());
        assert_eq!(map.len(), 6);
        assert!(map.row("A").unwrap().is_empty());
    }

    #[test]
    fn coverage_counts_block_entries_only() {
        let cfg = chain();
        assert_eq!(compute_coverage(&cfg, &set(&[])), 0);
        assert_eq!(compute_coverage(&cfg, &set(&["A1", "B1"])), 0);
        assert_eq!(compute_coverage(&cfg, &set(&["A", "A1", "B", "Z"])), 2);
    }

    #[test]
    fn coverage_is_monotonic() {
        let cfg = chain();
        let all = ["A", "B", "C", "D", "E", "T", "A1", "Z"];
        let mut s1 = HashSet::new();
        for (i, pc) in all.iter().enumerate() {
            let mut s2 = s1.clone();
            s2.insert(pc.to_string());
            assert!(compute_coverage(&cfg, &s1) <= compute_coverage(&cfg, &s2));
            if i % 2 == 0 {
                s1 = s2;
            }
        }
    }

    #[test]
    fn delta_coverage() {
        let cfg = chain();
        let cumulative = set(&["A", "A1", "B"]);
        assert_eq!(compute_delta_coverage(&cfg, &set(&["B", "T"]), &cumulative), 1);
        assert_eq!(compute_delta_coverage(&cfg, &set(&["A"]), &cumulative), 0);
        assert_eq!(compute_delta_coverage(&cfg, &set(&["C", "D"]), &set(&[])), 2);
    }

    #[test]
    fn min_distance_sums_per_target_minima() {
        let cfg = ControlFlowGraph::new()
            .with_block("A", ["B", "C"], ["A"])
            .with_block("B", ["T1"], ["B"])
            .with_block("C", ["T2"], ["C"])
            .with_block("T1", Vec::<String>::new(), ["T1", "x"])
            .with_block("T2", Vec::<String>::new(), ["T2", "y"]);
        let map = compute_distance_map(&cfg, &set(&["x", "y"]));
        assert_eq!(compute_min_distance(&map, &set(&["A"])), 4);
        assert_eq!(compute_min_distance(&map, &set(&["A", "B"])), 3);
        assert_eq!(compute_min_distance(&map, &set(&["B", "C"])), 2);
        // B cannot reach T2.
        assert_eq!(compute_min_distance(&map, &set(&["B"])), INFINITE_DISTANCE);
        assert_eq!(compute_min_distance(&map, &set(&[])), INFINITE_DISTANCE);
    }

    #[test]
    fn delta_min_distance() {
        let map = compute_distance_map(&chain(), &set(&["T1"]));
        let cumulative = set(&["A"]);
        assert_eq!(compute_delta_min_distance(&map, &set(&["B"]), &cumulative), 1);
        assert_eq!(compute_delta_min_distance(&map, &set(&["C"]), &cumulative), 0);
    }

    #[test]
    fn first_distance_measurement_is_absolute() {
        let map = compute_distance_map(&chain(), &set(&["T1"]));
        let tx = set(&["C", "A"]);
        assert_eq!(
            compute_delta_min_distance(&map, &tx, &HashSet::new()),
            compute_min_distance(&map, &tx)
        );
        assert_eq!(compute_delta_min_distance(&map, &tx, &HashSet::new()), 2);
    }

    #[test]
    fn tracker_accumulates() {
        let mut tracker = FitnessTracker::new(chain(), &set(&["T1"]));
        assert_eq!(
            tracker.record(["C", "C1"]),
            Fitness { delta_coverage: 1, delta_min_distance: 3 }
        );
        assert_eq!(
            tracker.record(["B", "B1"]),
            Fitness { delta_coverage: 1, delta_min_distance: 2 }
        );
        assert_eq!(
            tracker.record(["C"]),
            Fitness { delta_coverage: 0, delta_min_distance: 0 }
        );
        assert_eq!(tracker.coverage(), 2);
        assert_eq!(tracker.min_distance(), 1);
    }
}
