//! Job builder
//!
//! The only way a pass changes a job: append new operators and replace
//! existing ones, each replacement at most once per builder.

use indexmap::IndexSet;

use crate::error::{QatResult, TransformError};
use crate::graph::maps::{build_node_index_map, NodeId, NodeIndexMap};
use crate::proto::{BlobDescProto, JobProto, OperatorConf, ParallelConf, PlacementGroup};

/// Mutation sink over an owned job
#[derive(Debug)]
pub struct JobBuilder {
    job: JobProto,
    op_index: NodeIndexMap,
    added: Vec<String>,
    mutated: IndexSet<String>,
}

impl JobBuilder {
    /// Create a builder over `job`
    pub fn new(job: JobProto) -> QatResult<Self> {
        let op_index = build_node_index_map(&job)?;
        Ok(Self {
            job,
            op_index,
            added: Vec::new(),
            mutated: IndexSet::new(),
        })
    }

    /// Append `ops` and place them on `parallel_conf`
    ///
    /// The batch is checked before anything is applied: a name already used
    /// by the job or repeated within the batch leaves the job untouched.
    pub fn add_ops(&mut self, parallel_conf: &ParallelConf, ops: Vec<OperatorConf>) -> QatResult<()> {
        for (i, op) in ops.iter().enumerate() {
            if op.name.is_empty() {
                return Err(TransformError::InvalidGraph(
                    "cannot add an operator with an empty name".to_string(),
                ));
            }
            if self.op_index.contains_key(&op.name)
                || ops[..i].iter().any(|prev| prev.name == op.name)
            {
                return Err(TransformError::DuplicateOp(op.name.clone()));
            }
        }
        if ops.is_empty() {
            return Ok(());
        }

        let group_idx = match self
            .job
            .placement
            .iter()
            .position(|g| g.parallel_conf.as_ref() == Some(parallel_conf))
        {
            Some(idx) => idx,
            None => {
                self.job.placement.push(PlacementGroup {
                    op_name: Vec::new(),
                    parallel_conf: Some(parallel_conf.clone()),
                });
                self.job.placement.len() - 1
            }
        };

        for op in ops {
            tracing::debug!(op = %op.name, op_type = op.op_type_name(), "add op");
            self.op_index.insert(op.name.clone(), NodeId(self.job.op.len()));
            self.job.placement[group_idx].op_name.push(op.name.clone());
            self.added.push(op.name.clone());
            self.job.op.push(op);
        }

        Ok(())
    }

    /// Declare descriptors for blobs of added operators
    ///
    /// An lbn that is already declared, or repeated within the batch, is
    /// rejected and nothing is applied.
    pub fn add_blob_descs(&mut self, descs: Vec<(String, BlobDescProto)>) -> QatResult<()> {
        for (i, (lbn, _)) in descs.iter().enumerate() {
            if self.job.logical_blob_desc.contains_key(lbn)
                || descs[..i].iter().any(|(prev, _)| prev == lbn)
            {
                return Err(TransformError::DuplicateBlobDesc(lbn.clone()));
            }
        }

        for (lbn, desc) in descs {
            tracing::trace!(lbn = %lbn, "declare blob desc");
            self.job.logical_blob_desc.insert(lbn, desc);
        }

        Ok(())
    }

    /// Replace existing operators by name
    ///
    /// Every operator may be replaced at most once over the lifetime of the
    /// builder. The batch is checked before anything is applied.
    pub fn mut_ops_only_once(&mut self, ops: Vec<OperatorConf>) -> QatResult<()> {
        for (i, op) in ops.iter().enumerate() {
            if !self.op_index.contains_key(&op.name) {
                return Err(TransformError::UnknownOp(op.name.clone()));
            }
            if self.mutated.contains(&op.name) || ops[..i].iter().any(|prev| prev.name == op.name) {
                return Err(TransformError::DuplicateMutation(op.name.clone()));
            }
        }

        for op in ops {
            let idx = self.op_index[&op.name].index();
            tracing::trace!(op = %op.name, "mutate op");
            self.mutated.insert(op.name.clone());
            self.job.op[idx] = op;
        }

        Ok(())
    }

    /// Current state of the job
    pub fn job(&self) -> &JobProto {
        &self.job
    }

    /// Names of operators appended through this builder, in order
    pub fn added_op_names(&self) -> &[String] {
        &self.added
    }

    /// Names of operators replaced through this builder, in order
    pub fn mutated_op_names(&self) -> Vec<&str> {
        self.mutated.iter().map(String::as_str).collect()
    }

    /// Finish and return the job
    pub fn build(self) -> JobProto {
        self.job
    }
}
