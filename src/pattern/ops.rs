//! Fused operator patterns
//!
//! Patterns are listed anchor first, i.e. in reverse execution order:
//! `["relu", "conv2d"]` matches a `conv2d` whose result flows into a `relu`.

use crate::graph::{NodeId, OpGraph};

/// conv2d followed by relu, executed as one kernel at inference time
pub const CONV_RELU: &[&str] = &["relu", "conv2d"];

/// Every producer/activation pair the inference runtime fuses
pub const FUSED_PATTERNS: &[&[&str]] = &[CONV_RELU];

/// Consumer that gets fused into `id`, if any
///
/// A pair only fuses when the producer has exactly one outgoing edge and that
/// edge ends at the pattern's activation.
pub fn fused_consumer(graph: &OpGraph, id: NodeId) -> Option<NodeId> {
    let op_type = graph.node(id).user_op_type_name()?;
    let edge = graph.sole_out_edge(id)?;
    let consumer = graph.node(edge.dst_node()).user_op_type_name()?;

    FUSED_PATTERNS
        .iter()
        .any(|pattern| matches!(pattern, [anchor, producer] if *producer == op_type && *anchor == consumer))
        .then(|| edge.dst_node())
}

/// Node whose outputs carry the value of `id` after inference-time fusion
pub fn inference_output_node(graph: &OpGraph, id: NodeId) -> NodeId {
    fused_consumer(graph, id).unwrap_or(id)
}
