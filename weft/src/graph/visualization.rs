//! Graph visualization: export the node/edge table as Graphviz DOT or Mermaid text.

use std::fmt::Write;

use super::conditional::NextEntry;
use super::CompiledStateGraph;
use super::{END, START};

/// (from, to, conditional) in a stable order: START first, then nodes in
/// registration order; targets in declaration order.
fn edge_list(graph: &CompiledStateGraph) -> Vec<(&str, &str, bool)> {
    let sources = std::iter::once(START).chain(graph.nodes.iter().map(|(n, _)| n.as_str()));
    let mut edges = Vec::new();
    for source in sources {
        match graph.next_map.get(source) {
            Some(NextEntry::Static(targets)) => {
                edges.extend(targets.iter().map(|t| (source, t.as_str(), false)));
            }
            Some(NextEntry::Conditional(router)) => {
                edges.extend(router.destinations().iter().map(|t| (source, t.as_str(), true)));
            }
            None => {}
        }
    }
    edges
}

/// Generate Graphviz DOT for the graph. Conditional edges are dashed.
pub fn generate_dot(graph: &CompiledStateGraph) -> String {
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];",
        END
    );
    for (name, _) in &graph.nodes {
        let _ = writeln!(dot, "  \"{}\";", name);
    }
    dot.push('\n');
    for (from, to, conditional) in edge_list(graph) {
        if conditional {
            let _ = writeln!(dot, "  \"{}\" -> \"{}\" [style=dashed];", from, to);
        } else {
            let _ = writeln!(dot, "  \"{}\" -> \"{}\";", from, to);
        }
    }
    dot.push_str("}\n");
    dot
}

/// Generate a Mermaid flowchart for the graph. Conditional edges are dotted.
pub fn generate_mermaid(graph: &CompiledStateGraph) -> String {
    let mut text = String::from("graph TD;\n");
    let _ = writeln!(text, "  {}([START]):::first", START);
    for (name, _) in &graph.nodes {
        let _ = writeln!(text, "  {}({})", name, name);
    }
    let _ = writeln!(text, "  {}([END]):::last", END);
    for (from, to, conditional) in edge_list(graph) {
        let arrow = if conditional { "-.->" } else { "-->" };
        let _ = writeln!(text, "  {} {} {};", from, arrow, to);
    }
    text
}
