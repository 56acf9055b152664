//! Graph traversal utilities
//!
//! Provides a DFS-ordered topological walk over an [`OpGraph`], in either
//! direction, and a predicate-driven walk built on top of it.

use smallvec::SmallVec;

use crate::error::{QatResult, TransformError};
use crate::graph::{NodeId, OpGraph, OpNode};

/// Direction of traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward: start at sources, follow consumer edges
    Forward,
    /// Backward: start at sinks, follow producer edges
    Backward,
}

type Neighbours = SmallVec<[NodeId; 4]>;

/// Nodes that must be visited before `id` in `direction`
fn fathers(graph: &OpGraph, direction: Direction, id: NodeId) -> Neighbours {
    match direction {
        Direction::Forward => graph.in_nodes(id).collect(),
        Direction::Backward => graph.out_nodes(id).collect(),
    }
}

/// Nodes that become candidates once `id` is visited
fn children(graph: &OpGraph, direction: Direction, id: NodeId) -> Neighbours {
    match direction {
        Direction::Forward => graph.out_nodes(id).collect(),
        Direction::Backward => graph.in_nodes(id).collect(),
    }
}

/// Visit every node in topological order, depth first
///
/// Starts from the sources (sinks for [`Direction::Backward`]). A node is
/// pushed once all of its fathers have been visited, so every node is handed
/// to `handler` exactly once and after all of its fathers. Returns the number
/// of visited nodes; a graph with a cycle is rejected after the reachable
/// acyclic part has been handled.
pub fn dfs_topo_for_each_node<F>(
    graph: &OpGraph,
    direction: Direction,
    mut handler: F,
) -> QatResult<usize>
where
    F: FnMut(NodeId) -> QatResult<()>,
{
    let starts = match direction {
        Direction::Forward => graph.source_nodes(),
        Direction::Backward => graph.sink_nodes(),
    };

    let mut visited = vec![false; graph.node_count()];
    let mut stack: Vec<NodeId> = starts.into_iter().rev().collect();
    let mut count = 0;

    while let Some(id) = stack.pop() {
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        count += 1;
        handler(id)?;

        for child in children(graph, direction, id).into_iter().rev() {
            if visited[child.index()] {
                continue;
            }
            if fathers(graph, direction, child)
                .iter()
                .all(|f| visited[f.index()])
            {
                stack.push(child);
            }
        }
    }

    if count != graph.node_count() {
        return Err(TransformError::InvalidGraph(format!(
            "graph '{}' contains a cycle: topological walk reached {} of {} nodes",
            graph.name(),
            count,
            graph.node_count()
        )));
    }

    Ok(count)
}

/// Predicates and callback driving [`dfs_topo_walk`]
///
/// A single visitor object lets the father predicate observe state that
/// `visit` updates, e.g. a set grown during the walk.
pub trait TopoVisitor {
    /// Node is visited unconditionally, no other predicate is consulted
    fn is_start(&self, _node: &OpNode) -> bool {
        false
    }

    /// Node may be visited if one of its fathers is satisfied
    fn is_satisfied(&self, node: &OpNode) -> bool;

    /// Father qualifies a satisfied node for a visit
    fn is_father_satisfied(&self, father: &OpNode) -> bool;

    /// Called at most once per node
    fn visit(&mut self, node: &OpNode) -> QatResult<()>;
}

/// Predicate-driven topological walk
///
/// For each node in topological order: start nodes are visited outright;
/// otherwise a satisfied node is visited when any father satisfies
/// [`TopoVisitor::is_father_satisfied`]. The father scan stops at the first
/// match.
pub fn dfs_topo_walk<V>(graph: &OpGraph, direction: Direction, visitor: &mut V) -> QatResult<()>
where
    V: TopoVisitor + ?Sized,
{
    dfs_topo_for_each_node(graph, direction, |id| {
        let node = graph.node(id);
        if visitor.is_start(node) {
            return visitor.visit(node);
        }
        if visitor.is_satisfied(node)
            && fathers(graph, direction, id)
                .into_iter()
                .any(|f| visitor.is_father_satisfied(graph.node(f)))
        {
            visitor.visit(node)?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_input_op, make_job, make_user_op};

    fn make_chain_graph() -> OpGraph {
        let job = make_job(
            "chain",
            vec![
                make_input_op("x", &[4]),
                make_user_op("node_0", "conv2d", &["x/out"]),
                make_user_op("node_1", "relu", &["node_0/out_0"]),
                make_user_op("node_2", "conv2d", &["node_1/out_0"]),
                make_user_op("node_3", "relu", &["node_2/out_0"]),
            ],
        );
        OpGraph::new(&job).unwrap()
    }

    fn make_diamond_graph() -> OpGraph {
        let job = make_job(
            "diamond",
            vec![
                make_input_op("x", &[4]),
                make_user_op("c", "add_n", &["a/out_0", "b/out_0"]),
                make_user_op("a", "relu", &["x/out"]),
                make_user_op("b", "tanh", &["x/out"]),
            ],
        );
        OpGraph::new(&job).unwrap()
    }

    fn order(graph: &OpGraph, direction: Direction) -> Vec<String> {
        let mut names = Vec::new();
        dfs_topo_for_each_node(graph, direction, |id| {
            names.push(graph.node(id).name().to_string());
            Ok(())
        })
        .unwrap();
        names
    }

    #[test]
    fn test_forward_chain() {
        let graph = make_chain_graph();
        assert_eq!(
            order(&graph, Direction::Forward),
            vec!["x", "node_0", "node_1", "node_2", "node_3"]
        );
    }

    #[test]
    fn test_backward_chain() {
        let graph = make_chain_graph();
        assert_eq!(
            order(&graph, Direction::Backward),
            vec!["node_3", "node_2", "node_1", "node_0", "x"]
        );
    }

    #[test]
    fn test_join_waits_for_all_fathers() {
        // c is declared before its producers; the walk must still defer it
        let graph = make_diamond_graph();
        let names = order(&graph, Direction::Forward);

        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "x");
        assert_eq!(names[3], "c");
    }

    #[test]
    fn test_cycle_rejected() {
        let job = make_job(
            "cycle",
            vec![
                make_input_op("x", &[4]),
                make_user_op("a", "add_n", &["x/out", "b/out_0"]),
                make_user_op("b", "relu", &["a/out_0"]),
            ],
        );
        let graph = OpGraph::new(&job).unwrap();

        let result = dfs_topo_for_each_node(&graph, Direction::Forward, |_| Ok(()));
        assert!(matches!(result, Err(TransformError::InvalidGraph(_))));
    }

    #[test]
    fn test_handler_error_stops_walk() {
        let graph = make_chain_graph();
        let mut seen = 0;
        let result = dfs_topo_for_each_node(&graph, Direction::Forward, |_| {
            seen += 1;
            if seen == 2 {
                Err(TransformError::Internal("stop".into()))
            } else {
                Ok(())
            }
        });

        assert!(result.is_err());
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_empty_graph() {
        let graph = OpGraph::new(&make_job("empty", vec![])).unwrap();
        assert_eq!(
            dfs_topo_for_each_node(&graph, Direction::Forward, |_| Ok(())).unwrap(),
            0
        );
    }

    /// Marks nodes reachable from a `conv2d` through `relu` nodes
    struct ReluAfterConv {
        marked: Vec<String>,
    }

    impl TopoVisitor for ReluAfterConv {
        fn is_satisfied(&self, node: &OpNode) -> bool {
            node.user_op_type_name() == Some("relu")
        }

        fn is_father_satisfied(&self, father: &OpNode) -> bool {
            father.user_op_type_name() == Some("conv2d")
                || self.marked.iter().any(|m| m == father.name())
        }

        fn visit(&mut self, node: &OpNode) -> QatResult<()> {
            self.marked.push(node.name().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_walk_visits_only_qualified_nodes() {
        let graph = make_chain_graph();
        let mut visitor = ReluAfterConv { marked: Vec::new() };

        dfs_topo_walk(&graph, Direction::Forward, &mut visitor).unwrap();
        assert_eq!(visitor.marked, vec!["node_1", "node_3"]);
    }

    struct StartAtInputs {
        visited: Vec<String>,
    }

    impl TopoVisitor for StartAtInputs {
        fn is_start(&self, node: &OpNode) -> bool {
            node.user_op_type_name().is_none()
        }

        fn is_satisfied(&self, _node: &OpNode) -> bool {
            true
        }

        fn is_father_satisfied(&self, _father: &OpNode) -> bool {
            false
        }

        fn visit(&mut self, node: &OpNode) -> QatResult<()> {
            self.visited.push(node.name().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_start_nodes_bypass_predicates() {
        let graph = make_chain_graph();
        let mut visitor = StartAtInputs {
            visited: Vec::new(),
        };

        dfs_topo_walk(&graph, Direction::Forward, &mut visitor).unwrap();
        assert_eq!(visitor.visited, vec!["x"]);
    }
}
