use std::fmt::Display;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::NetworkError;

/// Upper bound on the sum of all capacities of a network.
///
/// Flow values, cut capacities, residual entries and signed net flows all stay below it.
pub const MAX_TOTAL_CAPACITY: u64 = i64::MAX as u64;

/// Residual capacity table of a directed flow network.
///
/// Vertices are dense indices `0..vertex_count`. Every edge `(u, v)` that was ever given a
/// capacity also owns a reverse entry `(v, u)`, so pushing flow never has to allocate.
/// Pushing flow moves capacity between entries, so `total_capacity` only changes through
/// [`FlowNetwork::set_capacity`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowNetwork {
    adj_list: Vec<FxHashMap<usize, u64>>,
    total_capacity: u64,
}

impl FlowNetwork {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adj_list: vec![FxHashMap::default(); vertex_count],
            total_capacity: 0,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adj_list.len()
    }

    /// Sum of every residual entry. Constant while flow is pushed.
    pub fn total_capacity(&self) -> u64 {
        self.total_capacity
    }

    /// Current residual capacity of `(from, to)`, 0 when the edge does not exist.
    pub fn capacity(&self, from: usize, to: usize) -> u64 {
        self.adj_list
            .get(from)
            .and_then(|edges| edges.get(&to))
            .copied()
            .unwrap_or(0)
    }

    /// Replaces the residual capacity of `(from, to)`.
    ///
    /// Fails when the network total would pass [`MAX_TOTAL_CAPACITY`].
    pub fn set_capacity(&mut self, from: usize, to: usize, value: u64) -> Result<(), NetworkError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Err(NetworkError::SelfLoop {
                vertex: from.to_string(),
            });
        }
        self.total_capacity = bounded_total(self.total_capacity - self.capacity(from, to), value)
            .ok_or_else(|| NetworkError::CapacityOverflow {
                from: from.to_string(),
                to: to.to_string(),
                capacity: value,
                limit: MAX_TOTAL_CAPACITY,
            })?;
        self.adj_list[from].insert(to, value);
        self.adj_list[to].entry(from).or_insert(0);
        Ok(())
    }

    /// Moves `amount` units of residual capacity from `(from, to)` to `(to, from)`.
    ///
    /// Panics when `amount` exceeds the residual capacity of `(from, to)`: that breaks flow
    /// conservation and can only come from a caller defect.
    pub fn push_flow(&mut self, from: usize, to: usize, amount: u64) {
        let available = self.capacity(from, to);
        assert!(
            amount <= available,
            "pushing {} units along {} -> {} exceeds residual capacity {}",
            amount,
            from,
            to,
            available
        );
        if amount == 0 {
            return;
        }

        *self.adj_list[from].entry(to).or_insert(0) -= amount;
        let reverse = self.adj_list[to].entry(from).or_insert(0);
        *reverse = reverse.checked_add(amount).unwrap_or_else(|| {
            panic!("reverse capacity of {} -> {} overflows", to, from)
        });
    }

    /// Outgoing edges of `node` with strictly positive residual capacity.
    pub fn residual_edges(&self, node: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.adj_list[node]
            .iter()
            .filter(|(_, &capacity)| capacity > 0)
            .map(|(&head, &capacity)| (head, capacity))
    }

    /// Every vertex sharing a residual entry with `node`, in either direction.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj_list[node].keys().copied()
    }

    /// Immutable copy of the current capacities, to be taken before any flow is pushed.
    pub fn snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot {
            adj_list: self.adj_list.clone(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), NetworkError> {
        if index < self.vertex_count() {
            Ok(())
        } else {
            Err(NetworkError::VertexOutOfRange {
                index,
                vertex_count: self.vertex_count(),
            })
        }
    }
}

fn bounded_total(total: u64, capacity: u64) -> Option<u64> {
    total
        .checked_add(capacity)
        .filter(|&total| total <= MAX_TOTAL_CAPACITY)
}

/// The original capacities of a network, captured before solving.
///
/// Residual capacities alone cannot tell real edges from reverse bookkeeping entries,
/// so cut and flow readback compare the solved network against this copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacitySnapshot {
    adj_list: Vec<FxHashMap<usize, u64>>,
}

impl CapacitySnapshot {
    pub fn vertex_count(&self) -> usize {
        self.adj_list.len()
    }

    pub fn capacity(&self, from: usize, to: usize) -> u64 {
        self.adj_list
            .get(from)
            .and_then(|edges| edges.get(&to))
            .copied()
            .unwrap_or(0)
    }

    /// Edges with positive original capacity, sorted by `(from, to)`.
    pub fn edges(&self) -> Vec<(usize, usize, u64)> {
        let mut edges: Vec<_> = self
            .adj_list
            .iter()
            .enumerate()
            .flat_map(|(from, edges)| {
                edges
                    .iter()
                    .filter(|(_, &capacity)| capacity > 0)
                    .map(move |(&to, &capacity)| (from, to, capacity))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Net flow currently routed from `from` to `to` in `network`.
    pub fn net_flow(&self, network: &FlowNetwork, from: usize, to: usize) -> i64 {
        self.capacity(from, to) as i64 - network.capacity(from, to) as i64
    }

    /// Inflow minus outflow at `node`. Zero for every vertex but source and sink.
    pub fn excess(&self, network: &FlowNetwork, node: usize) -> i64 {
        network
            .neighbors(node)
            .map(|other| self.net_flow(network, other, node))
            .sum()
    }

    /// Original edges carrying positive flow, with the amount they carry.
    pub fn edge_flows(&self, network: &FlowNetwork) -> Vec<(usize, usize, u64)> {
        self.edges()
            .into_iter()
            .filter_map(|(from, to, capacity)| {
                let flow = self.net_flow(network, from, to).clamp(0, capacity as i64) as u64;
                (flow > 0).then_some((from, to, flow))
            })
            .collect()
    }
}

/// Two-way map between caller labels and dense vertex indices, in first-seen order.
#[derive(Clone, Debug)]
pub struct VertexLabels<L> {
    labels: Vec<L>,
    indices: FxHashMap<L, usize>,
}

impl<L> Default for VertexLabels<L> {
    fn default() -> Self {
        Self {
            labels: vec![],
            indices: FxHashMap::default(),
        }
    }
}

impl<L: Clone + Eq + Hash> VertexLabels<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, label: &L) -> usize {
        if let Some(&index) = self.indices.get(label) {
            return index;
        }
        let index = self.labels.len();
        self.labels.push(label.clone());
        self.indices.insert(label.clone(), index);
        index
    }

    pub fn index_of(&self, label: &L) -> Option<usize> {
        self.indices.get(label).copied()
    }

    pub fn label(&self, index: usize) -> &L {
        &self.labels[index]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &L)> {
        self.labels.iter().enumerate()
    }
}

/// Collects labelled edges, validating them before any network exists.
pub struct NetworkBuilder<L> {
    labels: VertexLabels<L>,
    capacities: FxHashMap<(usize, usize), u64>,
    edge_order: Vec<(usize, usize)>,
    total_capacity: u64,
}

impl<L> Default for NetworkBuilder<L> {
    fn default() -> Self {
        Self {
            labels: VertexLabels::default(),
            capacities: FxHashMap::default(),
            edge_order: vec![],
            total_capacity: 0,
        }
    }
}

impl<L: Clone + Eq + Hash + Display> NetworkBuilder<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, label: &L) -> usize {
        self.labels.intern(label)
    }

    pub fn add_edge(&mut self, from: &L, to: &L, capacity: i64) -> Result<&mut Self, NetworkError> {
        if from == to {
            return Err(NetworkError::SelfLoop {
                vertex: from.to_string(),
            });
        }
        if capacity < 0 {
            return Err(NetworkError::NegativeCapacity {
                from: from.to_string(),
                to: to.to_string(),
                capacity,
            });
        }
        let capacity = capacity as u64;

        let key = (self.labels.intern(from), self.labels.intern(to));
        match self.capacities.get(&key) {
            Some(&first) if first != capacity => {
                return Err(NetworkError::ConflictingDuplicate {
                    from: from.to_string(),
                    to: to.to_string(),
                    first,
                    second: capacity,
                });
            }
            Some(_) => {}
            None => {
                self.total_capacity = bounded_total(self.total_capacity, capacity).ok_or_else(
                    || NetworkError::CapacityOverflow {
                        from: from.to_string(),
                        to: to.to_string(),
                        capacity,
                        limit: MAX_TOTAL_CAPACITY,
                    },
                )?;
                self.capacities.insert(key, capacity);
                self.edge_order.push(key);
            }
        }
        Ok(self)
    }

    pub fn build(self) -> (FlowNetwork, VertexLabels<L>) {
        let mut network = FlowNetwork::new(self.labels.len());
        network.total_capacity = self.total_capacity;
        for key in &self.edge_order {
            let (from, to) = *key;
            network.adj_list[from].insert(to, self.capacities[key]);
            network.adj_list[to].entry(from).or_insert(0);
        }
        (network, self.labels)
    }
}
