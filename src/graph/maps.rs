//! Graph map types and builders
//!
//! Defines the lookup tables backing [`OpGraph`](super::OpGraph).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{QatResult, TransformError};
use crate::proto::{BlobDescProto, JobProto, ParallelConf};

/// Stable index of a node inside an [`OpGraph`](super::OpGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Get the underlying index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable index of an edge inside an [`OpGraph`](super::OpGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl EdgeId {
    /// Get the underlying index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Edge list of a node, SmallVec optimized for common fan-in/fan-out of 1-4
pub type EdgeList = SmallVec<[EdgeId; 4]>;

/// Type alias for node index map: op_name → NodeId
pub type NodeIndexMap = FxHashMap<String, NodeId>;

/// Type alias for producer map: lbn → producing NodeId
pub type ProducerMap = FxHashMap<String, NodeId>;

/// Type alias for placement map: op_name → ParallelConf
pub type PlacementMap = FxHashMap<String, ParallelConf>;

/// Type alias for blob desc map: lbn → BlobDescProto
pub type BlobDescMap = FxHashMap<String, BlobDescProto>;

/// Build node index map, rejecting empty and duplicate op names
pub fn build_node_index_map(job: &JobProto) -> QatResult<NodeIndexMap> {
    let mut map = FxHashMap::default();

    for (idx, op) in job.op.iter().enumerate() {
        if op.name.is_empty() {
            return Err(TransformError::InvalidGraph(format!(
                "operator #{} has an empty name",
                idx
            )));
        }
        if map.insert(op.name.clone(), NodeId(idx)).is_some() {
            return Err(TransformError::InvalidGraph(format!(
                "duplicate operator name '{}'",
                op.name
            )));
        }
    }

    Ok(map)
}

/// Build producer map
///
/// Maps each logical blob to the node that produces it. A blob with two
/// producers breaks the naming scheme and is rejected.
pub fn build_producer_map(job: &JobProto) -> QatResult<ProducerMap> {
    let mut map = FxHashMap::default();

    for (idx, op) in job.op.iter().enumerate() {
        for lbn in op.output_lbns() {
            if let Some(prev) = map.insert(lbn.clone(), NodeId(idx)) {
                return Err(TransformError::InvalidGraph(format!(
                    "logical blob '{}' produced by both '{}' and '{}'",
                    lbn, job.op[prev.index()].name, op.name
                )));
            }
        }
    }

    Ok(map)
}

/// Build placement map from placement groups
pub fn build_placement_map(job: &JobProto) -> PlacementMap {
    let mut map = FxHashMap::default();

    for group in &job.placement {
        let conf = group.parallel_conf.clone().unwrap_or_default();
        for name in &group.op_name {
            map.insert(name.clone(), conf.clone());
        }
    }

    map
}

/// Build blob desc map
pub fn build_blob_desc_map(job: &JobProto) -> BlobDescMap {
    job.logical_blob_desc
        .iter()
        .map(|(lbn, desc)| (lbn.clone(), desc.clone()))
        .collect()
}
