//! Downstream white set
//!
//! Nodes that may consume already quantized values: every node reached from an
//! Int8 node through an unbroken chain of Int8 or Transparent operators.

#![allow(missing_docs)]

use rustc_hash::FxHashSet;

use crate::error::{QatResult, TransformError};
use crate::graph::{NodeId, OpGraph, OpNode};
use crate::pattern::{dfs_topo_walk, Direction, TopoVisitor};

use super::config::QatConfig;
use super::rewrite::is_fake_quant_marker;

/// Set of nodes inside quantized territory
#[derive(Debug, Default, Clone)]
pub struct WhiteSet {
    nodes: FxHashSet<NodeId>,
}

impl WhiteSet {
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }
}

struct WhitePropagation<'a> {
    config: &'a QatConfig,
    white: WhiteSet,
}

impl WhitePropagation<'_> {
    fn is_int8(&self, node: &OpNode) -> bool {
        node.user_op_type_name()
            .is_some_and(|op_type| self.config.int8_list.contains(op_type))
    }
}

impl TopoVisitor for WhitePropagation<'_> {
    fn is_satisfied(&self, node: &OpNode) -> bool {
        // markers pass the domain of their input through
        is_fake_quant_marker(node.op_conf())
            || node
                .user_op_type_name()
                .is_some_and(|op_type| self.config.is_int8_or_transparent(op_type))
    }

    fn is_father_satisfied(&self, father: &OpNode) -> bool {
        self.is_int8(father) || self.white.contains(father.id())
    }

    fn visit(&mut self, node: &OpNode) -> QatResult<()> {
        if !self.white.nodes.insert(node.id()) {
            return Err(TransformError::DuplicateWhiteNode(node.name().to_string()));
        }
        tracing::trace!(node = node.name(), "downstream white");
        Ok(())
    }
}

/// Compute the downstream white set of `graph`
pub fn downstream_white_set(graph: &OpGraph, config: &QatConfig) -> QatResult<WhiteSet> {
    let mut propagation = WhitePropagation {
        config,
        white: WhiteSet::default(),
    };
    dfs_topo_walk(graph, Direction::Forward, &mut propagation)?;
    Ok(propagation.white)
}
