use thiserror::Error;

/// Malformed flow network input, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("self-loop on vertex {vertex}")]
    SelfLoop { vertex: String },

    #[error("negative capacity {capacity} on edge {from} -> {to}")]
    NegativeCapacity {
        from: String,
        to: String,
        capacity: i64,
    },

    #[error("edge {from} -> {to} declared twice with capacities {first} and {second}")]
    ConflictingDuplicate {
        from: String,
        to: String,
        first: u64,
        second: u64,
    },

    #[error("vertex index {index} out of range for a network of {vertex_count} vertices")]
    VertexOutOfRange { index: usize, vertex_count: usize },

    #[error("capacity {capacity} on edge {from} -> {to} takes the network total past {limit}")]
    CapacityOverflow {
        from: String,
        to: String,
        capacity: u64,
        limit: u64,
    },

    #[error("empty capacity range {start}..={end}")]
    EmptyCapacityRange { start: u64, end: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    #[error("graph is not bipartite: edge {u} - {v} joins two vertices of the same side")]
    NotBipartite { u: String, v: String },

    #[error("self-loop on vertex {vertex}")]
    SelfLoop { vertex: String },

    #[error("vertex {vertex} is listed on both sides")]
    OverlappingSides { vertex: String },

    #[error("edge {u} - {v} leaves the given partition")]
    OutsidePartition { u: String, v: String },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read instance: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing problem header (expected `p flow <source> <sink>` or `p match`)")]
    MissingHeader,

    #[error("unknown problem kind `{0}`")]
    UnknownProblem(String),

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}
