use std::fmt::Display;
use std::hash::Hash;

use log::{info, warn};

use crate::augmenting_path::SearchOrder;
use crate::bipartite::{check_partition, two_coloring, Bipartition, UndirectedGraph};
use crate::error::MatchingError;
use crate::matching::{max_matching, max_matching_with_limit, Matching};
use crate::max_flow::{max_flow, max_flow_with_limit};
use crate::network::FlowNetwork;
use crate::time_limit::TimeLimit;

/// Unit-capacity network `source -> left -> right -> sink` built from a bipartite graph.
///
/// Graph vertices keep their indices; `source` and `sink` are appended after them.
#[derive(Clone, Debug)]
pub struct ReducedNetwork {
    pub network: FlowNetwork,
    pub source: usize,
    pub sink: usize,
}

/// Fails unless every edge at a vertex of `left` or `right` crosses from one side to the other.
pub fn to_flow_network(
    adjacency: &[Vec<usize>],
    left: &[usize],
    right: &[usize],
) -> Result<ReducedNetwork, MatchingError> {
    check_partition(adjacency, left, right)?;
    let vertex_count = adjacency.len();
    let (source, sink) = (vertex_count, vertex_count + 1);
    let mut network = FlowNetwork::new(vertex_count + 2);

    for &node in right {
        network.set_capacity(node, sink, 1)?;
    }

    for &node in left {
        network.set_capacity(source, node, 1)?;
        for &neighbor in &adjacency[node] {
            network.set_capacity(node, neighbor, 1)?;
        }
    }

    Ok(ReducedNetwork {
        network,
        source,
        sink,
    })
}

impl ReducedNetwork {
    /// Reads the matching out of a solved network: a left-right edge is matched when its
    /// forward capacity dropped to 0 and its reverse capacity rose to 1.
    pub fn matching(&self, left: &[usize], right: &[usize]) -> Vec<(usize, usize)> {
        let mut is_right = vec![false; self.source];
        for &node in right {
            is_right[node] = true;
        }

        let mut pairs = vec![];
        for &u in left {
            for v in self.network.neighbors(u) {
                if v < self.source
                    && is_right[v]
                    && self.network.capacity(u, v) == 0
                    && self.network.capacity(v, u) == 1
                {
                    pairs.push((u, v));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Matching obtained through the flow reduction.
#[derive(Clone, Debug)]
pub struct FlowMatching {
    pub flow: u64,
    pub pairs: Vec<(usize, usize)>,
    pub bipartition: Bipartition,
}

pub fn matching_via_flow<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
) -> Result<FlowMatching, MatchingError> {
    let bipartition = two_coloring(graph)?;
    let mut reduced = to_flow_network(graph.adjacency(), &bipartition.left, &bipartition.right)?;
    let flow = max_flow(&mut reduced.network, reduced.source, reduced.sink);
    let pairs = reduced.matching(&bipartition.left, &bipartition.right);

    Ok(FlowMatching {
        flow,
        pairs,
        bipartition,
    })
}

/// [`matching_via_flow`] under a caller budget. `Ok(None)` when the budget expired.
pub fn matching_via_flow_with_limit<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
    time_limit: &TimeLimit,
) -> Result<Option<FlowMatching>, MatchingError> {
    let bipartition = two_coloring(graph)?;
    let mut reduced = to_flow_network(graph.adjacency(), &bipartition.left, &bipartition.right)?;
    let Some(flow) = max_flow_with_limit(
        &mut reduced.network,
        reduced.source,
        reduced.sink,
        SearchOrder::BreadthFirst,
        time_limit,
    ) else {
        return Ok(None);
    };
    let pairs = reduced.matching(&bipartition.left, &bipartition.right);

    Ok(Some(FlowMatching {
        flow,
        pairs,
        bipartition,
    }))
}

/// Kuhn's matching next to the flow-based one for the same graph.
#[derive(Clone, Debug)]
pub struct CrossCheck {
    pub kuhn: Matching,
    pub flow: FlowMatching,
}

impl CrossCheck {
    /// Sizes agree. The pairs themselves may differ when several maximum matchings exist.
    pub fn agrees(&self) -> bool {
        self.kuhn.size as u64 == self.flow.flow && self.flow.pairs.len() == self.kuhn.size
    }
}

pub fn cross_validate<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
) -> Result<CrossCheck, MatchingError> {
    let flow = matching_via_flow(graph)?;
    let kuhn = max_matching(graph.adjacency(), &flow.bipartition.left)?;
    Ok(log_agreement(CrossCheck { kuhn, flow }))
}

/// [`cross_validate`] with both solvers sharing one budget.
pub fn cross_validate_with_limit<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
    time_limit: &TimeLimit,
) -> Result<Option<CrossCheck>, MatchingError> {
    let Some(flow) = matching_via_flow_with_limit(graph, time_limit)? else {
        return Ok(None);
    };
    let Some(kuhn) =
        max_matching_with_limit(graph.adjacency(), &flow.bipartition.left, time_limit)?
    else {
        return Ok(None);
    };
    Ok(Some(log_agreement(CrossCheck { kuhn, flow })))
}

fn log_agreement(check: CrossCheck) -> CrossCheck {
    if check.agrees() {
        info!("Matching size {} confirmed by max flow", check.kuhn.size);
    } else {
        warn!(
            "Kuhn matching has {} pairs but max flow is {} ({} pairs read back)",
            check.kuhn.size,
            check.flow.flow,
            check.flow.pairs.len()
        );
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_has_unit_capacities() {
        // 0 - 2, 0 - 3, 1 - 2
        let adjacency = vec![vec![2, 3], vec![2], vec![0, 1], vec![0]];
        let reduced = to_flow_network(&adjacency, &[0, 1], &[2, 3]).unwrap();
        let network = &reduced.network;

        assert_eq!((reduced.source, reduced.sink), (4, 5));
        assert_eq!(network.capacity(4, 0), 1);
        assert_eq!(network.capacity(4, 1), 1);
        assert_eq!(network.capacity(0, 3), 1);
        assert_eq!(network.capacity(1, 2), 1);
        assert_eq!(network.capacity(3, 5), 1);
        // Right to left only exists as a residual entry
        assert_eq!(network.capacity(2, 0), 0);
        assert_eq!(network.capacity(1, 3), 0);
    }

    #[test]
    fn readback_follows_residual_capacities() {
        let adjacency = vec![vec![2, 3], vec![2], vec![0, 1], vec![0]];
        let mut reduced = to_flow_network(&adjacency, &[0, 1], &[2, 3]).unwrap();
        assert!(reduced.matching(&[0, 1], &[2, 3]).is_empty());

        let flow = max_flow(&mut reduced.network, reduced.source, reduced.sink);
        assert_eq!(flow, 2);
        assert_eq!(reduced.matching(&[0, 1], &[2, 3]), vec![(0, 3), (1, 2)]);
    }

    #[test]
    fn both_methods_agree_on_the_lab_graph() {
        let edges = [
            (7, 10), (7, 14), (9, 14), (2, 11), (7, 8), (2, 6), (3, 6),
            (9, 10), (7, 12), (5, 6), (3, 9), (2, 7), (5, 9), (6, 10),
            (2, 9), (3, 11), (11, 15), (6, 13), (6, 16), (9, 15), (4, 6),
            (6, 12), (11, 13), (6, 15), (6, 8), (8, 9),
            (7, 13), (9, 16), (11, 14), (4, 11), (5, 11), (4, 7),
        ];
        let graph = UndirectedGraph::from_edges(edges).unwrap();
        let check = cross_validate(&graph).unwrap();
        assert!(check.agrees());
        assert_eq!(check.kuhn.size, 4);
        assert!(check.kuhn.is_valid_for(graph.adjacency()));

        let flow_matching = Matching {
            size: check.flow.pairs.len(),
            pairs: check.flow.pairs.clone(),
            mate: vec![],
        };
        assert!(flow_matching.is_valid_for(graph.adjacency()));
    }

    #[test]
    fn expired_budget_gives_no_cross_check() {
        let graph = UndirectedGraph::from_edges([(1, 3), (1, 4), (2, 3)]).unwrap();
        let limit = TimeLimit::unlimited().with_max_steps(0);
        assert!(cross_validate_with_limit(&graph, &limit).unwrap().is_none());

        let limit = TimeLimit::unlimited();
        let check = cross_validate_with_limit(&graph, &limit).unwrap().unwrap();
        assert_eq!(check.kuhn.size, 2);
        assert!(check.agrees());
    }

    #[test]
    fn invalid_partition_is_rejected() {
        let triangle = vec![vec![1, 2], vec![0, 2], vec![0, 1]];
        assert!(matches!(
            to_flow_network(&triangle, &[0], &[1, 2]),
            Err(MatchingError::NotBipartite { .. })
        ));
        assert!(matches!(
            to_flow_network(&triangle, &[0, 1], &[1, 2]),
            Err(MatchingError::OverlappingSides { .. })
        ));

        // Edge 0 - 3 would be dropped if 3 were left out
        let adjacency = vec![vec![2, 3], vec![2], vec![0, 1], vec![0]];
        assert!(matches!(
            to_flow_network(&adjacency, &[0, 1], &[2]),
            Err(MatchingError::OutsidePartition { .. })
        ));
    }

    #[test]
    fn non_bipartite_input_fails_closed() {
        let graph = UndirectedGraph::from_edges([(3, 7), (7, 5), (5, 3)]).unwrap();
        assert!(matches!(
            matching_via_flow(&graph),
            Err(MatchingError::NotBipartite { .. })
        ));
    }
}
