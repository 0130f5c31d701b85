use std::collections::VecDeque;
use std::fmt::Display;
use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::error::{MatchingError, NetworkError};
use crate::network::VertexLabels;

/// Simple undirected graph over labelled vertices, parallel edges collapsed.
#[derive(Clone, Debug)]
pub struct UndirectedGraph<L> {
    labels: VertexLabels<L>,
    adj_list: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl<L: Clone + Eq + Hash + Display> UndirectedGraph<L> {
    pub fn from_edges(edges: impl IntoIterator<Item = (L, L)>) -> Result<Self, MatchingError> {
        let mut labels = VertexLabels::new();
        let mut adj_list: Vec<Vec<usize>> = vec![];
        let mut unique = vec![];
        let mut seen = FxHashSet::default();

        for (u, v) in edges {
            if u == v {
                return Err(MatchingError::SelfLoop {
                    vertex: u.to_string(),
                });
            }
            let (u, v) = (labels.intern(&u), labels.intern(&v));
            adj_list.resize(labels.len(), vec![]);
            if seen.insert((u.min(v), u.max(v))) {
                adj_list[u].push(v);
                adj_list[v].push(u);
                unique.push((u, v));
            }
        }

        Ok(Self {
            labels,
            adj_list,
            edges: unique,
        })
    }

    pub fn label(&self, node: usize) -> &L {
        self.labels.label(node)
    }

    pub fn labels(&self) -> &VertexLabels<L> {
        &self.labels
    }
}

impl<L> UndirectedGraph<L> {
    pub fn vertex_count(&self) -> usize {
        self.adj_list.len()
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adj_list[node]
    }

    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adj_list
    }

    /// Edges in insertion order, duplicates removed.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adj_list
            .get(u)
            .map_or(false, |neighbors| neighbors.contains(&v))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A verified two-colouring: every edge joins a left vertex to a right one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bipartition {
    pub side: Vec<Side>,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

impl Bipartition {
    pub fn is_left(&self, node: usize) -> bool {
        self.side[node] == Side::Left
    }
}

/// Breadth-first two-colouring of every connected component.
///
/// The lowest-index vertex of each component, and every isolated vertex, goes left.
/// Fails with [`MatchingError::NotBipartite`] naming the first edge whose endpoints
/// received the same colour.
pub fn two_coloring<L: Clone + Eq + Hash + Display>(
    graph: &UndirectedGraph<L>,
) -> Result<Bipartition, MatchingError> {
    let mut colors: Vec<Option<Side>> = vec![None; graph.vertex_count()];

    for start in 0..graph.vertex_count() {
        if colors[start].is_some() {
            continue;
        }
        colors[start] = Some(Side::Left);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            let Some(color) = colors[node] else {
                continue;
            };
            for &neighbor in graph.neighbors(node) {
                match colors[neighbor] {
                    None => {
                        colors[neighbor] = Some(color.opposite());
                        queue.push_back(neighbor);
                    }
                    Some(other) if other == color => {
                        return Err(MatchingError::NotBipartite {
                            u: graph.label(node).to_string(),
                            v: graph.label(neighbor).to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let side: Vec<Side> = colors
        .into_iter()
        .map(|color| color.unwrap_or(Side::Left))
        .collect();
    let left = (0..side.len()).filter(|&v| side[v] == Side::Left).collect();
    let right = (0..side.len()).filter(|&v| side[v] == Side::Right).collect();

    Ok(Bipartition { side, left, right })
}

/// Checks that no edge joins two vertices of `left`.
///
/// Neighbours of left vertices that are not listed count as right.
pub fn check_left_side(adjacency: &[Vec<usize>], left: &[usize]) -> Result<(), MatchingError> {
    let sides = assign_sides(adjacency, left, &[])?;
    for &u in left {
        for &v in &adjacency[u] {
            if sides[v] == Some(Side::Left) {
                return Err(MatchingError::NotBipartite {
                    u: u.to_string(),
                    v: v.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Checks that every edge at a vertex of `left` or `right` joins a left vertex to a right one.
pub fn check_partition(
    adjacency: &[Vec<usize>],
    left: &[usize],
    right: &[usize],
) -> Result<(), MatchingError> {
    let sides = assign_sides(adjacency, left, right)?;
    for (u, side) in sides.iter().enumerate() {
        let Some(side) = *side else {
            continue;
        };
        for &v in &adjacency[u] {
            match sides[v] {
                Some(other) if other == side => {
                    return Err(MatchingError::NotBipartite {
                        u: u.to_string(),
                        v: v.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    return Err(MatchingError::OutsidePartition {
                        u: u.to_string(),
                        v: v.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Side of every listed vertex, `None` for the rest. Also range-checks every neighbour.
fn assign_sides(
    adjacency: &[Vec<usize>],
    left: &[usize],
    right: &[usize],
) -> Result<Vec<Option<Side>>, MatchingError> {
    let vertex_count = adjacency.len();
    let in_range = |index: usize| {
        if index < vertex_count {
            Ok(index)
        } else {
            Err(NetworkError::VertexOutOfRange {
                index,
                vertex_count,
            })
        }
    };

    let mut sides = vec![None; vertex_count];
    for (nodes, side) in [(left, Side::Left), (right, Side::Right)] {
        for &node in nodes {
            let current = sides[in_range(node)?];
            match current {
                Some(other) if other != side => {
                    return Err(MatchingError::OverlappingSides {
                        vertex: node.to_string(),
                    });
                }
                _ => sides[node] = Some(side),
            }
        }
    }
    for neighbors in adjacency {
        for &v in neighbors {
            in_range(v)?;
        }
    }
    Ok(sides)
}
