//! Operator graph built from a job
//!
//! `OpGraph` is the read-only view the rewriter analyses. Nodes are operators,
//! edges connect a producer to a consumer and carry every logical blob that
//! flows between the pair.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{QatResult, TransformError};
use crate::proto::extensions::split_lbn;
use crate::proto::{BlobDescProto, DataType, JobProto, OperatorConf, ParallelConf};

use super::maps::{
    build_blob_desc_map, build_node_index_map, build_placement_map, build_producer_map,
    BlobDescMap, EdgeId, EdgeList, NodeId, NodeIndexMap, ProducerMap,
};

/// One operator of the graph
#[derive(Debug, Clone)]
pub struct OpNode {
    id: NodeId,
    conf: OperatorConf,
    parallel_conf: ParallelConf,
    in_edges: EdgeList,
    out_edges: EdgeList,
}

impl OpNode {
    /// Node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Operator name
    pub fn name(&self) -> &str {
        &self.conf.name
    }

    /// Operator conf as declared in the job
    pub fn op_conf(&self) -> &OperatorConf {
        &self.conf
    }

    /// Op type name of a user op, `None` for system ops
    pub fn user_op_type_name(&self) -> Option<&str> {
        self.conf
            .user_conf()
            .map(|conf| conf.op_type_name.as_str())
    }

    /// Placement of this node
    pub fn parallel_conf(&self) -> &ParallelConf {
        &self.parallel_conf
    }

    /// Incoming edges
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    /// Outgoing edges
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }
}

/// Producer → consumer connection
#[derive(Debug, Clone)]
pub struct OpEdge {
    id: EdgeId,
    src: NodeId,
    dst: NodeId,
    lbis: SmallVec<[String; 1]>,
    lbi2ibns: IndexMap<String, SmallVec<[String; 1]>>,
}

impl OpEdge {
    /// Edge id
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Producer node
    pub fn src_node(&self) -> NodeId {
        self.src
    }

    /// Consumer node
    pub fn dst_node(&self) -> NodeId {
        self.dst
    }

    /// Logical blobs carried by this edge, in first-use order
    pub fn lbis(&self) -> &[String] {
        &self.lbis
    }

    /// Consumer input blob names bound to `lbn`
    pub fn ibns_of(&self, lbn: &str) -> Option<&[String]> {
        self.lbi2ibns.get(lbn).map(|ibns| ibns.as_slice())
    }
}

/// Read-only operator graph
#[derive(Debug)]
pub struct OpGraph {
    name: String,
    default_data_type: DataType,
    nodes: Vec<OpNode>,
    edges: Vec<OpEdge>,
    node_index_map: NodeIndexMap,
    producer_map: ProducerMap,
    blob_desc_map: BlobDescMap,
}

impl OpGraph {
    /// Build the graph view of `job`
    pub fn new(job: &JobProto) -> QatResult<Self> {
        let node_index_map = build_node_index_map(job)?;
        let producer_map = build_producer_map(job)?;
        let placement_map = build_placement_map(job);

        let mut nodes = Vec::with_capacity(job.op.len());
        for (idx, op) in job.op.iter().enumerate() {
            let parallel_conf = placement_map
                .get(&op.name)
                .cloned()
                .ok_or_else(|| TransformError::MissingPlacement(op.name.clone()))?;
            nodes.push(OpNode {
                id: NodeId(idx),
                conf: op.clone(),
                parallel_conf,
                in_edges: EdgeList::new(),
                out_edges: EdgeList::new(),
            });
        }

        let mut edges: Vec<OpEdge> = Vec::new();
        for (dst_idx, op) in job.op.iter().enumerate() {
            let dst = NodeId(dst_idx);
            let mut edge_by_src: FxHashMap<NodeId, EdgeId> = FxHashMap::default();

            for (ibn, lbn) in op.input_bindings() {
                split_lbn(lbn)?;
                let src = *producer_map.get(lbn).ok_or_else(|| {
                    TransformError::InvalidGraph(format!(
                        "input '{}' of '{}' consumes '{}' which no operator produces",
                        ibn, op.name, lbn
                    ))
                })?;

                let edge_id = match edge_by_src.get(&src) {
                    Some(&id) => id,
                    None => {
                        let id = EdgeId(edges.len());
                        edges.push(OpEdge {
                            id,
                            src,
                            dst,
                            lbis: SmallVec::new(),
                            lbi2ibns: IndexMap::new(),
                        });
                        nodes[src.index()].out_edges.push(id);
                        nodes[dst.index()].in_edges.push(id);
                        edge_by_src.insert(src, id);
                        id
                    }
                };

                let edge = &mut edges[edge_id.index()];
                if !edge.lbis.iter().any(|l| l == lbn) {
                    edge.lbis.push(lbn.to_string());
                }
                edge.lbi2ibns.entry(lbn.to_string()).or_default().push(ibn);
            }
        }

        Ok(Self {
            name: job.name.clone(),
            default_data_type: job.default_data_type(),
            nodes,
            edges,
            node_index_map,
            producer_map,
            blob_desc_map: build_blob_desc_map(job),
        })
    }

    // ========================================================================
    // Node and edge accessors
    // ========================================================================

    /// Job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default data type declared by the job
    pub fn default_data_type(&self) -> DataType {
        self.default_data_type
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &OpNode {
        &self.nodes[id.index()]
    }

    /// Get a node by operator name
    pub fn node_by_name(&self, name: &str) -> Option<&OpNode> {
        self.node_index_map.get(name).map(|&id| self.node(id))
    }

    /// Get an edge by id
    pub fn edge(&self, id: EdgeId) -> &OpEdge {
        &self.edges[id.index()]
    }

    /// Iterate over all nodes in job order
    pub fn nodes(&self) -> impl Iterator<Item = &OpNode> {
        self.nodes.iter()
    }

    /// Iterate over all edges
    pub fn edges(&self) -> impl Iterator<Item = &OpEdge> {
        self.edges.iter()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========================================================================
    // Blob accessors
    // ========================================================================

    /// Node producing `lbn`
    pub fn producer_of(&self, lbn: &str) -> Option<&OpNode> {
        self.producer_map.get(lbn).map(|&id| self.node(id))
    }

    /// Declared descriptor of `lbn`
    pub fn logical_blob_desc(&self, lbn: &str) -> QatResult<&BlobDescProto> {
        self.blob_desc_map
            .get(lbn)
            .ok_or_else(|| TransformError::MissingBlobDesc(lbn.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_input_op, make_job, make_user_op, make_variable_op};
    use crate::proto::PlacementGroup;

    fn make_test_job() -> JobProto {
        make_job(
            "test",
            vec![
                make_input_op("x", &[1, 3, 8, 8]),
                make_variable_op("w", &[4, 3, 3, 3]),
                make_user_op("conv", "conv2d", &["x/out", "w/out"]),
                make_user_op("relu", "relu", &["conv/out_0"]),
            ],
        )
    }

    #[test]
    fn test_graph_creation() {
        let graph = OpGraph::new(&make_test_job()).unwrap();

        assert_eq!(graph.name(), "test");
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.default_data_type(), DataType::Float);
    }

    #[test]
    fn test_node_lookup() {
        let graph = OpGraph::new(&make_test_job()).unwrap();

        let conv = graph.node_by_name("conv").unwrap();
        assert_eq!(conv.user_op_type_name(), Some("conv2d"));
        assert_eq!(conv.in_edges().len(), 2);
        assert_eq!(conv.out_edges().len(), 1);
        assert_eq!(conv.parallel_conf().device_tag, "cpu");

        let x = graph.node_by_name("x").unwrap();
        assert_eq!(x.user_op_type_name(), None);
        assert!(graph.node_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_edge_carries_blob_and_slot() {
        let graph = OpGraph::new(&make_test_job()).unwrap();

        let relu = graph.node_by_name("relu").unwrap();
        let edge = graph.edge(relu.in_edges()[0]);
        assert_eq!(graph.node(edge.src_node()).name(), "conv");
        assert_eq!(edge.lbis(), &["conv/out_0".to_string()]);
        assert_eq!(edge.ibns_of("conv/out_0").unwrap(), &["in_0".to_string()]);
    }

    #[test]
    fn test_two_blobs_between_one_pair_share_an_edge() {
        let mut split = make_user_op("split", "identity", &["x/out"]);
        split
            .user_conf_mut()
            .unwrap()
            .output
            .get_mut("out")
            .unwrap()
            .s
            .push("split/out_1".to_string());
        let job = make_job(
            "multi",
            vec![
                make_input_op("x", &[2]),
                split,
                make_user_op("add", "add_n", &["split/out_0", "split/out_1"]),
            ],
        );

        let graph = OpGraph::new(&job).unwrap();
        let add = graph.node_by_name("add").unwrap();
        assert_eq!(add.in_edges().len(), 1);
        assert_eq!(graph.edge(add.in_edges()[0]).lbis().len(), 2);
    }

    #[test]
    fn test_same_blob_in_two_slots() {
        let job = make_job(
            "square",
            vec![
                make_input_op("x", &[2, 2]),
                make_user_op("mm", "matmul", &["x/out", "x/out"]),
            ],
        );

        let graph = OpGraph::new(&job).unwrap();
        let edge = graph.edge(graph.node_by_name("mm").unwrap().in_edges()[0]);
        assert_eq!(edge.lbis().len(), 1);
        assert_eq!(edge.ibns_of("x/out").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_producer_rejected() {
        let job = make_job("bad", vec![make_user_op("relu", "relu", &["ghost/out"])]);
        assert!(matches!(
            OpGraph::new(&job),
            Err(TransformError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_missing_placement_rejected() {
        let mut job = make_test_job();
        job.placement = vec![PlacementGroup::default()];
        assert!(matches!(
            OpGraph::new(&job),
            Err(TransformError::MissingPlacement(_))
        ));
    }

    #[test]
    fn test_logical_blob_desc() {
        let graph = OpGraph::new(&make_test_job()).unwrap();
        assert_eq!(
            graph.logical_blob_desc("w/out").unwrap().shape,
            vec![4, 3, 3, 3]
        );
        assert!(graph.logical_blob_desc("w/out_7").is_err());
        assert_eq!(graph.producer_of("conv/out_0").unwrap().name(), "conv");
    }
}
