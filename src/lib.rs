pub mod error;
pub mod network;

pub mod augmenting_path;
pub mod max_flow;
pub mod min_cut;

pub mod bipartite;
pub mod matching;
pub mod reduction;

pub mod capacities;
pub mod parser;
pub mod report;
pub mod time_limit;
