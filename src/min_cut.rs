use log::debug;

use crate::augmenting_path::SearchOrder;
use crate::max_flow::{ford_fulkerson, max_flow_with_limit};
use crate::network::{CapacitySnapshot, FlowNetwork};
use crate::time_limit::TimeLimit;

/// Vertices reachable from `source` over edges with positive residual capacity.
pub fn source_side(network: &FlowNetwork, source: usize) -> Vec<bool> {
    let mut visited = vec![false; network.vertex_count()];
    let mut stack = vec![source];
    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        for (head, _) in network.residual_edges(node) {
            if !visited[head] {
                stack.push(head);
            }
        }
    }
    visited
}

/// Edges leaving the source side of a fully drained `network`, sorted ascending.
///
/// Only edges with positive capacity in `original` count, so reverse residual entries never
/// show up in the cut. On a network that still has augmenting paths the result is meaningless.
pub fn min_cut(
    network: &FlowNetwork,
    original: &CapacitySnapshot,
    source: usize,
) -> Vec<(usize, usize)> {
    let reachable = source_side(network, source);
    original
        .edges()
        .into_iter()
        .filter(|&(from, to, _)| reachable[from] && !reachable[to])
        .map(|(from, to, _)| (from, to))
        .collect()
}

/// Maximum flow value together with a minimum cut certifying it.
#[derive(Clone, Debug)]
pub struct FlowOutcome {
    pub max_flow: u64,
    pub cut: Vec<(usize, usize)>,
    pub cut_capacity: u64,
    /// Capacities before solving, for reading flows back out of the residual network.
    pub original: CapacitySnapshot,
}

impl FlowOutcome {
    pub fn edge_flows(&self, network: &FlowNetwork) -> Vec<(usize, usize, u64)> {
        self.original.edge_flows(network)
    }
}

/// Solves `network` to completion and extracts the matching minimum cut.
///
/// The original capacities are captured before the first augmentation.
/// Panics if the drained network still connects source and sink, or if the cut capacity
/// differs from the flow value: both mean the residual bookkeeping is broken.
pub fn max_flow_min_cut(
    network: &mut FlowNetwork,
    source: usize,
    sink: usize,
    order: SearchOrder,
) -> FlowOutcome {
    let original = network.snapshot();
    let max_flow = ford_fulkerson(network, source, sink, order);
    certify(network, original, source, sink, max_flow)
}

/// [`max_flow_min_cut`] under a caller budget. `None` when the budget expired first.
pub fn max_flow_min_cut_with_limit(
    network: &mut FlowNetwork,
    source: usize,
    sink: usize,
    order: SearchOrder,
    time_limit: &TimeLimit,
) -> Option<FlowOutcome> {
    let original = network.snapshot();
    let max_flow = max_flow_with_limit(network, source, sink, order, time_limit)?;
    Some(certify(network, original, source, sink, max_flow))
}

fn certify(
    network: &FlowNetwork,
    original: CapacitySnapshot,
    source: usize,
    sink: usize,
    max_flow: u64,
) -> FlowOutcome {
    if source == sink {
        return FlowOutcome {
            max_flow,
            cut: vec![],
            cut_capacity: 0,
            original,
        };
    }

    assert!(
        !source_side(network, source)[sink],
        "min cut requested while {} -> {} still has an augmenting path",
        source,
        sink
    );

    let cut = min_cut(network, &original, source);
    let cut_capacity: u64 = cut
        .iter()
        .map(|&(from, to)| original.capacity(from, to))
        .sum();
    assert_eq!(
        cut_capacity, max_flow,
        "cut capacity differs from the max flow value"
    );

    debug!("Min cut {} -> {}: {} edges", source, sink, cut.len());
    FlowOutcome {
        max_flow,
        cut,
        cut_capacity,
        original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::max_flow::max_flow;
    use crate::network::MAX_TOTAL_CAPACITY;

    // S=0, A=1, B=2, T=3
    fn diamond() -> FlowNetwork {
        let mut network = FlowNetwork::new(4);
        network.set_capacity(0, 1, 10).unwrap();
        network.set_capacity(0, 2, 5).unwrap();
        network.set_capacity(1, 3, 5).unwrap();
        network.set_capacity(2, 3, 10).unwrap();
        network
    }

    #[test]
    fn diamond_cut_matches_flow() {
        let mut network = diamond();
        let outcome = max_flow_min_cut(&mut network, 0, 3, SearchOrder::BreadthFirst);
        assert_eq!(outcome.max_flow, 10);
        assert_eq!(outcome.cut, vec![(0, 2), (1, 3)]);
        assert_eq!(outcome.cut_capacity, 10);
        assert_eq!(
            outcome.edge_flows(&network),
            vec![(0, 1, 5), (0, 2, 5), (1, 3, 5), (2, 3, 5)]
        );
    }

    #[test]
    fn cut_ignores_reverse_residual_edges() {
        let mut network = diamond();
        let original = network.snapshot();
        max_flow(&mut network, 0, 3);

        // Reverse entries such as (3, 1) now carry capacity but were never real edges.
        assert!(network.capacity(3, 1) > 0);
        let cut = min_cut(&network, &original, 0);
        assert!(cut.iter().all(|&(from, to)| original.capacity(from, to) > 0));
        assert_eq!(
            source_side(&network, 0),
            vec![true, true, false, false]
        );
    }

    #[test]
    fn source_equal_to_sink_has_empty_cut() {
        let mut network = diamond();
        let outcome = max_flow_min_cut(&mut network, 2, 2, SearchOrder::BreadthFirst);
        assert_eq!(outcome.max_flow, 0);
        assert!(outcome.cut.is_empty());
    }

    #[test]
    fn unreachable_sink_has_empty_cut() {
        let mut network = diamond();
        let outcome = max_flow_min_cut(&mut network, 3, 0, SearchOrder::BreadthFirst);
        assert_eq!(outcome.max_flow, 0);
        assert!(outcome.cut.is_empty());
    }

    #[test]
    fn parallel_paths_at_the_capacity_bound() {
        // S=0, T=4, three paths through 1, 2 and 3 sharing the whole budget
        let capacity = MAX_TOTAL_CAPACITY / 6;
        let mut network = FlowNetwork::new(5);
        for middle in 1..=3 {
            network.set_capacity(0, middle, capacity).unwrap();
            network.set_capacity(middle, 4, capacity).unwrap();
        }

        let outcome = max_flow_min_cut(&mut network, 0, 4, SearchOrder::BreadthFirst);
        assert_eq!(outcome.max_flow, 3 * capacity);
        assert_eq!(outcome.cut_capacity, 3 * capacity);
        assert_eq!(outcome.cut, vec![(0, 1), (0, 2), (0, 3)]);
        assert_eq!(outcome.original.excess(&network, 4), (3 * capacity) as i64);
    }

    #[test]
    #[should_panic(expected = "still has an augmenting path")]
    fn cut_before_convergence_is_rejected() {
        let network = diamond();
        let original = network.snapshot();
        certify(&network, original, 0, 3, 0);
    }
}
