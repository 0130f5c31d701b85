use std::fmt::Display;
use std::hash::Hash;
use std::io::{self, Write};

use crate::bipartite::UndirectedGraph;
use crate::min_cut::FlowOutcome;
use crate::network::{FlowNetwork, VertexLabels};
use crate::reduction::CrossCheck;

/// Flow value, cut edges and per-edge flows of a solved network.
pub fn write_flow_report<L: Clone + Eq + Hash + Display>(
    out: &mut impl Write,
    outcome: &FlowOutcome,
    solved: &FlowNetwork,
    labels: &VertexLabels<L>,
) -> io::Result<()> {
    writeln!(out, "Max flow: {}", outcome.max_flow)?;
    writeln!(out, "Min cut (capacity {}):", outcome.cut_capacity)?;
    for &(from, to) in &outcome.cut {
        writeln!(
            out,
            "  {} -> {} ({})",
            labels.label(from),
            labels.label(to),
            outcome.original.capacity(from, to)
        )?;
    }
    writeln!(out, "Edge flows:")?;
    for (from, to, flow) in outcome.edge_flows(solved) {
        writeln!(
            out,
            "  {} -> {} {}/{}",
            labels.label(from),
            labels.label(to),
            flow,
            outcome.original.capacity(from, to)
        )?;
    }
    Ok(())
}

pub fn write_matching_report<L: Clone + Eq + Hash + Display>(
    out: &mut impl Write,
    check: &CrossCheck,
    graph: &UndirectedGraph<L>,
) -> io::Result<()> {
    let bipartition = &check.flow.bipartition;
    writeln!(
        out,
        "Bipartition: {} left, {} right",
        bipartition.left.len(),
        bipartition.right.len()
    )?;

    writeln!(out, "Kuhn matching ({} pairs):", check.kuhn.size)?;
    write_pairs(out, &check.kuhn.pairs, graph)?;

    writeln!(
        out,
        "Flow matching (max flow {}, {} pairs):",
        check.flow.flow,
        check.flow.pairs.len()
    )?;
    write_pairs(out, &check.flow.pairs, graph)?;

    writeln!(
        out,
        "Sizes agree: {}",
        if check.agrees() { "yes" } else { "no" }
    )
}

fn write_pairs<L: Clone + Eq + Hash + Display>(
    out: &mut impl Write,
    pairs: &[(usize, usize)],
    graph: &UndirectedGraph<L>,
) -> io::Result<()> {
    for &(u, v) in pairs {
        writeln!(out, "  {} - {}", graph.label(u), graph.label(v))?;
    }
    Ok(())
}
