use log::{debug, trace};

use crate::augmenting_path::{search, SearchOrder};
use crate::network::FlowNetwork;
use crate::time_limit::TimeLimit;

/// Edmonds-Karp maximum flow from `source` to `sink`, mutating `network` into its residual.
pub fn max_flow(network: &mut FlowNetwork, source: usize, sink: usize) -> u64 {
    ford_fulkerson(network, source, sink, SearchOrder::BreadthFirst)
}

/// Augments until no path is left, exploring residual edges in the given `order`.
pub fn ford_fulkerson(
    network: &mut FlowNetwork,
    source: usize,
    sink: usize,
    order: SearchOrder,
) -> u64 {
    if source == sink {
        return 0;
    }

    let mut tot_flow = 0;
    let mut augmentations = 0;
    while let Some(pushed) = augment_once(network, source, sink, order) {
        tot_flow += pushed;
        augmentations += 1;
    }

    debug!(
        "Max flow {} -> {}: {} after {} augmentations ({:?})",
        source, sink, tot_flow, augmentations, order
    );
    tot_flow
}

/// Same as [`ford_fulkerson`], but polls `time_limit` before every augmentation.
///
/// Returns `None` once the limit expires. The network is then left mid-solve and its
/// residual state must not be read as a flow or a cut.
pub fn max_flow_with_limit(
    network: &mut FlowNetwork,
    source: usize,
    sink: usize,
    order: SearchOrder,
    time_limit: &TimeLimit,
) -> Option<u64> {
    if source == sink {
        return Some(0);
    }

    let mut tot_flow = 0;
    loop {
        if !time_limit.can_progress() {
            debug!(
                "Max flow {} -> {} abandoned after {} steps",
                source,
                sink,
                time_limit.steps()
            );
            return None;
        }
        match augment_once(network, source, sink, order) {
            Some(pushed) => tot_flow += pushed,
            None => break,
        }
    }
    Some(tot_flow)
}

/// Finds one augmenting path and pushes its bottleneck along it.
///
/// Returns the amount pushed, or `None` when the sink is no longer reachable.
pub fn augment_once(
    network: &mut FlowNetwork,
    source: usize,
    sink: usize,
    order: SearchOrder,
) -> Option<u64> {
    let path = search(network, source, sink, order).path();
    if path.is_empty() {
        return None;
    }

    let mut bottleneck = u64::MAX;
    for edge in path.windows(2) {
        bottleneck = bottleneck.min(network.capacity(edge[0], edge[1]));
    }

    for edge in path.windows(2) {
        network.push_flow(edge[0], edge[1], bottleneck);
    }

    trace!("Augmented {} units along {:?}", bottleneck, path);
    Some(bottleneck)
}
