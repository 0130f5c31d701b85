use std::fmt::Display;
use std::hash::Hash;

use log::debug;

use crate::bipartite::{check_left_side, two_coloring, UndirectedGraph};
use crate::error::MatchingError;
use crate::time_limit::TimeLimit;

/// A matching together with its symmetric partner table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matching {
    pub size: usize,
    /// `(left, right)` pairs sorted by left vertex.
    pub pairs: Vec<(usize, usize)>,
    /// `mate[u] == Some(v)` iff `mate[v] == Some(u)`.
    pub mate: Vec<Option<usize>>,
}

impl Matching {
    fn from_mates(mate: Vec<Option<usize>>, left: &[usize]) -> Self {
        let mut pairs: Vec<_> = left
            .iter()
            .filter_map(|&u| mate[u].map(|v| (u, v)))
            .collect();
        pairs.sort_unstable();
        Self {
            size: pairs.len(),
            pairs,
            mate,
        }
    }

    /// Every pair is an edge of `adjacency` and no vertex is used twice.
    pub fn is_valid_for(&self, adjacency: &[Vec<usize>]) -> bool {
        let mut used = vec![false; adjacency.len()];
        for &(u, v) in &self.pairs {
            if u >= adjacency.len() || v >= adjacency.len() || used[u] || used[v] {
                return false;
            }
            if !adjacency[u].contains(&v) {
                return false;
            }
            used[u] = true;
            used[v] = true;
        }
        self.size == self.pairs.len()
    }
}

/// Maximum bipartite matching by Kuhn's algorithm.
///
/// `adjacency` lists the neighbours of every vertex. Fails with
/// [`MatchingError::NotBipartite`] when an edge joins two left vertices. Each unmatched
/// left vertex starts one augmenting search with a fresh `seen` set, so a search visits
/// every vertex at most once.
pub fn max_matching(adjacency: &[Vec<usize>], left: &[usize]) -> Result<Matching, MatchingError> {
    check_left_side(adjacency, left)?;
    let mut mate = vec![None; adjacency.len()];
    let mut seen = vec![false; adjacency.len()];

    for &root in left {
        if mate[root].is_some() {
            continue;
        }
        seen.fill(false);
        try_augment(root, adjacency, &mut mate, &mut seen, || true);
    }

    let matching = Matching::from_mates(mate, left);
    debug!(
        "Kuhn matching: {} pairs over {} left vertices",
        matching.size,
        left.len()
    );
    Ok(matching)
}

/// [`max_matching`] polling `time_limit` at every search expansion.
/// `Ok(None)` when the limit expires before the matching is maximum.
pub fn max_matching_with_limit(
    adjacency: &[Vec<usize>],
    left: &[usize],
    time_limit: &TimeLimit,
) -> Result<Option<Matching>, MatchingError> {
    check_left_side(adjacency, left)?;
    let mut mate = vec![None; adjacency.len()];
    let mut seen = vec![false; adjacency.len()];
    let mut expired = false;

    for &root in left {
        if mate[root].is_some() {
            continue;
        }
        seen.fill(false);
        try_augment(root, adjacency, &mut mate, &mut seen, || {
            expired = expired || !time_limit.can_progress();
            !expired
        });
        if expired {
            debug!("Kuhn matching abandoned after {} steps", time_limit.steps());
            return Ok(None);
        }
    }

    Ok(Some(Matching::from_mates(mate, left)))
}

/// Looks for an alternating path from the unmatched `root` to an unmatched right vertex,
/// flipping every pair along it on success.
fn try_augment(
    root: usize,
    adjacency: &[Vec<usize>],
    mate: &mut [Option<usize>],
    seen: &mut [bool],
    mut can_progress: impl FnMut() -> bool,
) -> bool {
    // Frames are (left vertex, next neighbour to try). via[k] is the right vertex that
    // links stack[k] to stack[k + 1].
    let mut stack = vec![(root, 0)];
    let mut via: Vec<usize> = vec![];

    while let Some(frame) = stack.last_mut() {
        if !can_progress() {
            return false;
        }

        let (node, cursor) = *frame;
        let Some(&right) = adjacency[node].get(cursor) else {
            stack.pop();
            via.pop();
            continue;
        };
        frame.1 += 1;

        if seen[right] {
            continue;
        }
        seen[right] = true;
        via.push(right);

        match mate[right] {
            Some(partner) => stack.push((partner, 0)),
            None => {
                for (&(left, _), &right) in stack.iter().zip(via.iter()) {
                    mate[left] = Some(right);
                    mate[right] = Some(left);
                }
                return true;
            }
        }
    }

    false
}

/// Two-colours `graph` and matches its left side against its right side.
///
/// Fails closed with [`MatchingError::NotBipartite`] instead of guessing a partition.
pub fn solve_matching<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
) -> Result<Matching, MatchingError> {
    let bipartition = two_coloring(graph)?;
    max_matching(graph.adjacency(), &bipartition.left)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_instance_is_fully_matched() {
        // left = {1, 2}, right = {3, 4}, edges 1-3, 1-4, 2-3
        let graph = UndirectedGraph::from_edges([(1, 3), (1, 4), (2, 3)]).unwrap();
        let matching = solve_matching(&graph).unwrap();
        assert_eq!(matching.size, 2);
        assert!(matching.is_valid_for(graph.adjacency()));

        let labelled: Vec<_> = matching
            .pairs
            .iter()
            .map(|&(u, v)| (*graph.label(u), *graph.label(v)))
            .collect();
        assert_eq!(labelled, vec![(1, 4), (2, 3)]);
    }

    #[test]
    fn augmenting_path_reroutes_earlier_pairs() {
        // 0 takes 3 first, 1 can only use 3, so 0 must move to 4, 2 then needs 5
        let adjacency = vec![
            vec![3, 4],
            vec![3],
            vec![4, 5],
            vec![0, 1],
            vec![0, 2],
            vec![2],
        ];
        let matching = max_matching(&adjacency, &[0, 1, 2]).unwrap();
        assert_eq!(matching.size, 3);
        assert_eq!(matching.pairs, vec![(0, 4), (1, 3), (2, 5)]);
        for (u, partner) in matching.mate.iter().enumerate() {
            if let Some(v) = partner {
                assert_eq!(matching.mate[*v], Some(u));
            }
        }
    }

    #[test]
    fn empty_left_side_and_isolated_vertices() {
        let adjacency = vec![vec![], vec![2], vec![1]];
        assert_eq!(max_matching(&adjacency, &[]).unwrap().size, 0);

        let matching = max_matching(&adjacency, &[0, 1]).unwrap();
        assert_eq!(matching.size, 1);
        assert_eq!(matching.mate[0], None);
    }

    #[test]
    fn non_bipartite_graph_is_rejected() {
        let graph = UndirectedGraph::from_edges([(1, 2), (2, 3), (3, 1)]).unwrap();
        assert!(matches!(
            solve_matching(&graph),
            Err(MatchingError::NotBipartite { .. })
        ));
    }

    #[test]
    fn invalid_matchings_are_detected() {
        let adjacency = vec![vec![2], vec![2], vec![0, 1]];
        let matching = Matching {
            size: 2,
            pairs: vec![(0, 2), (1, 2)],
            mate: vec![Some(2), Some(2), Some(1)],
        };
        assert!(!matching.is_valid_for(&adjacency));

        let matching = Matching {
            size: 1,
            pairs: vec![(0, 1)],
            mate: vec![Some(1), Some(0), None],
        };
        assert!(!matching.is_valid_for(&adjacency));
    }

    #[test]
    fn limit_expiring_mid_search_gives_no_result() {
        let adjacency = vec![vec![2, 3], vec![2], vec![0, 1], vec![0]];
        let limit = TimeLimit::unlimited().with_max_steps(2);
        assert_eq!(max_matching_with_limit(&adjacency, &[0, 1], &limit), Ok(None));

        let limit = TimeLimit::unlimited();
        assert_eq!(
            max_matching_with_limit(&adjacency, &[0, 1], &limit)
                .unwrap()
                .map(|m| m.size),
            Some(2)
        );
    }

    #[test]
    fn left_side_with_an_inner_edge_is_rejected() {
        let triangle = vec![vec![1, 2], vec![0, 2], vec![0, 1]];
        assert!(matches!(
            max_matching(&triangle, &[0, 1, 2]),
            Err(MatchingError::NotBipartite { .. })
        ));
        assert!(matches!(
            max_matching_with_limit(&triangle, &[0, 1], &TimeLimit::unlimited()),
            Err(MatchingError::NotBipartite { .. })
        ));

        // A valid choice of sides on the same adjacency still works
        let matching = max_matching(&triangle, &[0]).unwrap();
        assert_eq!(matching.size, 1);
        assert_eq!(matching.pairs, vec![(0, 1)]);
    }
}
