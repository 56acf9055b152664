//! Common utilities for passes
//!
//! Shared result type and the single-pass driver.

use crate::builder::JobBuilder;
use crate::error::QatResult;
use crate::graph::OpGraph;
use crate::proto::JobProto;
use crate::traits::JobPass;

/// Pass result for statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Names of inserted marker operators
    pub markers: Vec<String>,
    /// Number of distinct edges selected for a marker
    pub edges_marked: usize,
    /// Number of blob groups skipped because of their data type
    pub groups_skipped: usize,
    /// Number of consumer operators whose inputs were rewritten
    pub consumers_rewritten: usize,
    /// Size of the downstream white set
    pub white_set_size: usize,
}

impl PassResult {
    /// Create empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inserted marker
    pub fn record_marker(&mut self, op_name: &str) {
        self.markers.push(op_name.to_string());
    }

    /// Number of inserted markers
    pub fn markers_inserted(&self) -> usize {
        self.markers.len()
    }

    /// Whether the pass changed the job
    pub fn changed(&self) -> bool {
        !self.markers.is_empty() || self.consumers_rewritten > 0
    }

    /// Merge with another result
    pub fn merge(&mut self, other: PassResult) {
        self.markers.extend(other.markers);
        self.edges_marked += other.edges_marked;
        self.groups_skipped += other.groups_skipped;
        self.consumers_rewritten += other.consumers_rewritten;
        self.white_set_size += other.white_set_size;
    }
}

/// Run one pass over `job`
///
/// Builds the graph view, hands a builder over a copy of the job to the pass
/// and returns the rewritten job.
pub fn run_pass<P>(job: JobProto, pass: &P) -> QatResult<(JobProto, PassResult)>
where
    P: JobPass + ?Sized,
{
    let graph = OpGraph::new(&job)?;
    let mut builder = JobBuilder::new(job)?;

    tracing::debug!(pass = pass.name(), ops = graph.node_count(), "running pass");
    let result = pass.apply(&graph, &mut builder)?;

    Ok((builder.build(), result))
}
