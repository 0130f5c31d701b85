use std::collections::VecDeque;

use crate::network::FlowNetwork;

/// Order in which residual edges are explored when looking for an augmenting path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchOrder {
    /// Shortest paths first (Edmonds-Karp), at most O(V * E) augmentations.
    #[default]
    BreadthFirst,
    /// Plain Ford-Fulkerson. No bound on path length or augmentation count.
    DepthFirst,
}

/// Result of one search: the parent map and whether the sink was reached.
#[derive(Clone, Debug)]
pub struct PathSearch {
    source: usize,
    sink: usize,
    parent: Vec<Option<usize>>,
    found: bool,
}

impl PathSearch {
    pub fn found(&self) -> bool {
        self.found
    }

    /// Predecessor of `node` in the search tree. `None` for the source and unreached vertices.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Vertices of the augmenting path from source to sink, empty when none was found.
    pub fn path(&self) -> Vec<usize> {
        if !self.found {
            return vec![];
        }
        let mut path = vec![self.sink];
        let mut node = self.sink;
        while node != self.source {
            node = self.parent[node].unwrap_or_else(|| {
                panic!("parent chain broken at {} before reaching the source", node)
            });
            path.push(node);
        }
        path.reverse();
        path
    }
}

pub fn search(network: &FlowNetwork, source: usize, sink: usize, order: SearchOrder) -> PathSearch {
    match order {
        SearchOrder::BreadthFirst => find_path(network, source, sink),
        SearchOrder::DepthFirst => find_path_depth_first(network, source, sink),
    }
}

/// Breadth-first search over edges with positive residual capacity.
///
/// The returned path, if any, has the fewest edges among all augmenting paths.
/// `source == sink` never yields a path.
pub fn find_path(network: &FlowNetwork, source: usize, sink: usize) -> PathSearch {
    let mut parent = vec![None; network.vertex_count()];
    let mut found = false;

    if source != sink {
        let mut visited = vec![false; network.vertex_count()];
        let mut queue = VecDeque::from([source]);
        visited[source] = true;

        'search: while let Some(node) = queue.pop_front() {
            for (head, _) in network.residual_edges(node) {
                if visited[head] {
                    continue;
                }
                visited[head] = true;
                parent[head] = Some(node);
                if head == sink {
                    found = true;
                    break 'search;
                }
                queue.push_back(head);
            }
        }
    }

    PathSearch {
        source,
        sink,
        parent,
        found,
    }
}

/// Depth-first search with an explicit stack, so long paths cannot exhaust the call stack.
pub fn find_path_depth_first(network: &FlowNetwork, source: usize, sink: usize) -> PathSearch {
    let mut parent = vec![None; network.vertex_count()];
    let mut found = false;

    if source != sink {
        let mut visited = vec![false; network.vertex_count()];
        let mut stack = vec![(source, None)];

        while let Some((node, from)) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            parent[node] = from;
            if node == sink {
                found = true;
                break;
            }
            for (head, _) in network.residual_edges(node) {
                if !visited[head] {
                    stack.push((head, Some(node)));
                }
            }
        }
    }

    PathSearch {
        source,
        sink,
        parent,
        found,
    }
}
