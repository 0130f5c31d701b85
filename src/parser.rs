use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::bipartite::UndirectedGraph;
use crate::error::{MatchingError, NetworkError, ParseError};
use crate::network::{FlowNetwork, NetworkBuilder, VertexLabels};

/// A problem read from a text instance.
///
/// ```text
/// c comment
/// p flow S T
/// S A 10
/// ```
/// or `p match` followed by one undirected edge `u v` per line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedInstance {
    Flow {
        source: String,
        sink: String,
        edges: Vec<(String, String, i64)>,
    },
    Matching {
        edges: Vec<(String, String)>,
    },
}

/// A flow instance turned into a validated network.
pub struct FlowProblem {
    pub network: FlowNetwork,
    pub labels: VertexLabels<String>,
    pub source: usize,
    pub sink: usize,
}

impl ParsedInstance {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader(input: impl BufRead) -> Result<Self, ParseError> {
        let mut instance = None;

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_number = idx + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts.first() {
                None | Some(&"c") => continue,
                Some(&"p") => {
                    if instance.is_some() {
                        return Err(malformed(line_number, "duplicate problem header"));
                    }
                    instance = Some(Self::header(&parts[1..], line_number)?);
                }
                Some(_) => {
                    let Some(instance) = instance.as_mut() else {
                        return Err(ParseError::MissingHeader);
                    };
                    instance.push_edge(&parts, line_number)?;
                }
            }
        }

        instance.ok_or(ParseError::MissingHeader)
    }

    fn header(parts: &[&str], line_number: usize) -> Result<Self, ParseError> {
        match parts {
            ["flow", source, sink] => Ok(ParsedInstance::Flow {
                source: source.to_string(),
                sink: sink.to_string(),
                edges: vec![],
            }),
            ["flow", ..] => Err(malformed(line_number, "expected `p flow <source> <sink>`")),
            ["match"] => Ok(ParsedInstance::Matching { edges: vec![] }),
            ["match", ..] => Err(malformed(line_number, "expected `p match`")),
            [kind, ..] => Err(ParseError::UnknownProblem(kind.to_string())),
            [] => Err(malformed(line_number, "empty problem header")),
        }
    }

    fn push_edge(&mut self, parts: &[&str], line_number: usize) -> Result<(), ParseError> {
        match self {
            ParsedInstance::Flow { edges, .. } => {
                let [from, to, capacity] = parts else {
                    return Err(malformed(line_number, "expected `<from> <to> <capacity>`"));
                };
                let capacity = capacity.parse().map_err(|_| {
                    malformed(line_number, &format!("invalid capacity `{}`", capacity))
                })?;
                edges.push((from.to_string(), to.to_string(), capacity));
            }
            ParsedInstance::Matching { edges } => {
                let [u, v] = parts else {
                    return Err(malformed(line_number, "expected `<u> <v>`"));
                };
                edges.push((u.to_string(), v.to_string()));
            }
        }
        Ok(())
    }

    /// Builds the flow network, rejecting malformed edges.
    ///
    /// Terminals named only in the header become isolated vertices.
    pub fn flow_problem(&self) -> Option<Result<FlowProblem, NetworkError>> {
        let ParsedInstance::Flow {
            source,
            sink,
            edges,
        } = self
        else {
            return None;
        };
        Some(build_flow_problem(source, sink, edges))
    }

    pub fn matching_graph(&self) -> Option<Result<UndirectedGraph<String>, MatchingError>> {
        let ParsedInstance::Matching { edges } = self else {
            return None;
        };
        Some(UndirectedGraph::from_edges(edges.iter().cloned()))
    }
}

fn build_flow_problem(
    source: &str,
    sink: &str,
    edges: &[(String, String, i64)],
) -> Result<FlowProblem, NetworkError> {
    let mut builder = NetworkBuilder::new();
    for (from, to, capacity) in edges {
        builder.add_edge(from, to, *capacity)?;
    }
    let source = builder.add_vertex(&source.to_string());
    let sink = builder.add_vertex(&sink.to_string());
    let (network, labels) = builder.build();

    Ok(FlowProblem {
        network,
        labels,
        source,
        sink,
    })
}

fn malformed(line: usize, reason: &str) -> ParseError {
    ParseError::MalformedLine {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flow_instance() {
        let text = "c diamond\np flow S T\n\nS A 10\nS B 5\nA T 5\nB T 10\n";
        let instance = ParsedInstance::from_reader(text.as_bytes()).unwrap();
        let problem = instance.flow_problem().unwrap().unwrap();

        assert_eq!(problem.network.vertex_count(), 4);
        assert_eq!(problem.labels.label(problem.source), "S");
        assert_eq!(problem.labels.label(problem.sink), "T");
        assert!(instance.matching_graph().is_none());
    }

    #[test]
    fn reads_matching_instance() {
        let text = "p match\n1 3\n1 4\n2 3\n";
        let instance = ParsedInstance::from_reader(text.as_bytes()).unwrap();
        assert_eq!(
            instance,
            ParsedInstance::Matching {
                edges: vec![
                    ("1".to_string(), "3".to_string()),
                    ("1".to_string(), "4".to_string()),
                    ("2".to_string(), "3".to_string()),
                ]
            }
        );
        let graph = instance.matching_graph().unwrap().unwrap();
        assert_eq!(graph.vertex_count(), 4);
    }

    #[test]
    fn reports_malformed_input() {
        assert!(matches!(
            ParsedInstance::from_reader("S A 10\n".as_bytes()),
            Err(ParseError::MissingHeader)
        ));
        assert!(matches!(
            ParsedInstance::from_reader("p cover\n".as_bytes()),
            Err(ParseError::UnknownProblem(kind)) if kind == "cover"
        ));
        assert!(matches!(
            ParsedInstance::from_reader("p flow S T\nS A ten\n".as_bytes()),
            Err(ParseError::MalformedLine { line: 2, .. })
        ));
        assert!(matches!(
            ParsedInstance::from_reader("p match\n1 2 3\n".as_bytes()),
            Err(ParseError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn network_errors_surface_when_building() {
        let instance = ParsedInstance::from_reader("p flow S T\nS A -4\n".as_bytes()).unwrap();
        assert!(matches!(
            instance.flow_problem(),
            Some(Err(NetworkError::NegativeCapacity { capacity: -4, .. }))
        ));

        let instance =
            ParsedInstance::from_reader("p flow S T\nS A 9223372036854775807\nA T 1\n".as_bytes())
                .unwrap();
        assert!(matches!(
            instance.flow_problem(),
            Some(Err(NetworkError::CapacityOverflow { capacity: 1, .. }))
        ));
    }

    #[test]
    fn terminal_named_only_in_the_header_is_isolated() {
        let instance = ParsedInstance::from_reader("p flow S X\nS A 4\n".as_bytes()).unwrap();
        let mut problem = instance.flow_problem().unwrap().unwrap();

        assert_eq!(problem.network.vertex_count(), 3);
        assert_eq!(problem.labels.label(problem.sink), "X");
        let outcome = crate::min_cut::max_flow_min_cut(
            &mut problem.network,
            problem.source,
            problem.sink,
            crate::augmenting_path::SearchOrder::BreadthFirst,
        );
        assert_eq!(outcome.max_flow, 0);
        assert!(outcome.cut.is_empty());
    }
}
