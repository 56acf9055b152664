//! Marker synthesis and consumer rewrite
//!
//! Marked edges are grouped by the logical blob they carry. Each float group
//! gets one identity marker named after the blob, and every consumer in the
//! group is rebound to the marker output. Consumer confs are staged so that a
//! consumer touched by several groups is committed once with all its edits.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

use crate::builder::{JobBuilder, UserOpBuilder};
use crate::error::{QatResult, TransformError};
use crate::graph::{EdgeId, OpGraph};
use crate::proto::extensions::{gen_bn, gen_lbn};
use crate::proto::{BlobDescProto, DataType, OperatorConf, ParallelConf};
use crate::registry::IDENTITY_OP_TYPE;
use crate::transformers::common::PassResult;

/// Name suffix of every fake-quant marker
///
/// Markers carry no other tag, so any `identity` user op whose name ends in
/// this suffix is taken for a marker: edges touching it are never selected
/// and it propagates white status. User graphs should not name their own
/// identity ops this way.
pub const FAKE_QUANT_SUFFIX: &str = "-fake-quant";

/// Marker name for `lbn`, e.g. `conv/out_0` -> `conv-out_0-fake-quant`
pub fn fake_quant_op_name(lbn: &str) -> String {
    format!("{}{}", lbn.replace('/', "-"), FAKE_QUANT_SUFFIX)
}

/// Whether `conf` is a marker inserted by this pass
pub fn is_fake_quant_marker(conf: &OperatorConf) -> bool {
    conf.name.ends_with(FAKE_QUANT_SUFFIX)
        && conf
            .user_conf()
            .is_some_and(|user| user.op_type_name == IDENTITY_OP_TYPE)
}

/// Group marked edges by their single logical blob
pub fn group_edges_by_lbn(
    graph: &OpGraph,
    marked: &IndexSet<EdgeId>,
) -> QatResult<IndexMap<String, Vec<EdgeId>>> {
    let mut groups: IndexMap<String, Vec<EdgeId>> = IndexMap::new();

    for &id in marked {
        let edge = graph.edge(id);
        match edge.lbis() {
            [lbn] => groups.entry(lbn.clone()).or_default().push(id),
            lbis => {
                return Err(TransformError::UnsupportedEdge(format!(
                    "{} carries {} logical blobs",
                    graph.edge_name(edge),
                    lbis.len()
                )))
            }
        }
    }

    Ok(groups)
}

/// Insert one marker per float blob group and rebind its consumers
///
/// Nothing is written to `builder` until every group has been analysed, so
/// a marker name clash or a failing consumer leaves the builder untouched.
/// Each marker output is declared with the descriptor of the blob it copies.
pub fn insert_fake_quant_ops(
    graph: &OpGraph,
    marked: &IndexSet<EdgeId>,
    expected_data_type: DataType,
    builder: &mut JobBuilder,
    result: &mut PassResult,
) -> QatResult<()> {
    let groups = group_edges_by_lbn(graph, marked)?;

    let mut markers: Vec<(ParallelConf, OperatorConf)> = Vec::new();
    let mut marker_descs: Vec<(String, BlobDescProto)> = Vec::new();
    let mut marker_names: FxHashSet<String> = FxHashSet::default();
    let mut staged: IndexMap<String, OperatorConf> = IndexMap::new();

    for (lbn, edges) in &groups {
        let desc = graph.logical_blob_desc(lbn)?;
        let data_type = desc.data_type();
        if data_type != expected_data_type {
            tracing::debug!(lbn = %lbn, ?data_type, "skip non float blob");
            result.groups_skipped += 1;
            continue;
        }

        let Some(&first) = edges.first() else {
            continue;
        };
        let producer = graph.node(graph.edge(first).src_node());
        let marker_name = fake_quant_op_name(lbn);
        let marker_out = gen_lbn(&marker_name, &gen_bn("out", 0));

        let mut consumers = 0;
        for &id in edges {
            let edge = graph.edge(id);
            if edge.src_node() != producer.id() {
                return Err(TransformError::InconsistentProducer {
                    lbn: lbn.clone(),
                    expected: producer.name().to_string(),
                    actual: graph.node(edge.src_node()).name().to_string(),
                });
            }

            let ibn = match edge.ibns_of(lbn) {
                Some([ibn]) => ibn,
                Some(ibns) => {
                    return Err(TransformError::UnsupportedEdge(format!(
                        "{} binds {} to {} input slots",
                        graph.edge_name(edge),
                        lbn,
                        ibns.len()
                    )))
                }
                None => {
                    return Err(TransformError::Internal(format!(
                        "{} lists {} without a consuming slot",
                        graph.edge_name(edge),
                        lbn
                    )))
                }
            };

            let dst = graph.node(edge.dst_node());
            let conf = staged
                .entry(dst.name().to_string())
                .or_insert_with(|| dst.op_conf().clone());
            let old = conf.replace_input_lbn(ibn, &marker_out)?;
            if old != *lbn {
                return Err(TransformError::Internal(format!(
                    "{}/{} was bound to {}, expected {}",
                    dst.name(),
                    ibn,
                    old,
                    lbn
                )));
            }
            consumers += 1;
        }

        if consumers == 0 {
            continue;
        }

        if graph.node_by_name(&marker_name).is_some() || !marker_names.insert(marker_name.clone()) {
            return Err(TransformError::DuplicateOp(marker_name));
        }
        if graph.logical_blob_desc(&marker_out).is_ok() {
            return Err(TransformError::DuplicateBlobDesc(marker_out));
        }

        let marker = UserOpBuilder::new(&marker_name)
            .op(IDENTITY_OP_TYPE)
            .input("in", lbn)
            .output("out")
            .build()?;
        tracing::debug!(marker = %marker_name, lbn = %lbn, consumers, "insert fake quant");
        markers.push((producer.parallel_conf().clone(), marker));
        marker_descs.push((marker_out, desc.clone()));
    }

    for (parallel_conf, marker) in markers {
        result.record_marker(&marker.name);
        builder.add_ops(&parallel_conf, vec![marker])?;
    }
    builder.add_blob_descs(marker_descs)?;

    result.consumers_rewritten += staged.len();
    builder.mut_ops_only_once(staged.into_values().collect())
}
