use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::NetworkError;
use crate::network::{CapacitySnapshot, FlowNetwork};

pub const DEFAULT_CAPACITY_RANGE: RangeInclusive<u64> = 100..=1000;

/// Fresh network with the same positive edges as `original` and capacities drawn uniformly
/// from `range`.
///
/// Fails on an empty `range`, or when the drawn capacities add up past the network bound.
pub fn randomize_capacities(
    original: &CapacitySnapshot,
    range: RangeInclusive<u64>,
    rng: &mut impl Rng,
) -> Result<FlowNetwork, NetworkError> {
    if range.is_empty() {
        return Err(NetworkError::EmptyCapacityRange {
            start: *range.start(),
            end: *range.end(),
        });
    }

    let mut network = FlowNetwork::new(original.vertex_count());
    for (from, to, _) in original.edges() {
        network.set_capacity(from, to, rng.gen_range(range.clone()))?;
    }
    Ok(network)
}
