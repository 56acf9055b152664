//! Core traits for qat-rewriter
//!
//! Defines the interface every job rewriting pass implements.

use crate::builder::JobBuilder;
use crate::error::QatResult;
use crate::graph::OpGraph;
use crate::proto::JobProto;
use crate::transformers::common::{run_pass, PassResult};

/// A rewriting pass over a job
///
/// A pass reads the graph view and records its changes through the builder.
/// It never mutates the graph it analyses.
///
/// # Example
///
/// ```ignore
/// struct NoOp;
///
/// impl JobPass for NoOp {
///     fn name(&self) -> &'static str {
///         "NoOp"
///     }
///
///     fn apply(&self, _graph: &OpGraph, _builder: &mut JobBuilder) -> QatResult<PassResult> {
///         Ok(PassResult::new())
///     }
/// }
/// ```
pub trait JobPass {
    /// Name of the pass
    fn name(&self) -> &'static str;

    /// Whether the pass should run on `job` at all
    fn is_enabled(&self, _job: &JobProto) -> bool {
        true
    }

    /// Analyse `graph` and record the rewrite into `builder`
    fn apply(&self, graph: &OpGraph, builder: &mut JobBuilder) -> QatResult<PassResult>;
}

/// Passes applied in sequence, each on the output of the previous one
pub struct PassChain {
    passes: Vec<Box<dyn JobPass>>,
}

impl PassChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a pass to the chain
    #[allow(clippy::should_implement_trait)]
    pub fn add<P: JobPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Number of passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every enabled pass, rebuilding the graph view in between
    pub fn run(&self, mut job: JobProto) -> QatResult<(JobProto, PassResult)> {
        let mut total = PassResult::new();

        for pass in &self.passes {
            if !pass.is_enabled(&job) {
                tracing::debug!(pass = pass.name(), "pass disabled, skipping");
                continue;
            }
            let (next, result) = run_pass(job, pass.as_ref())?;
            total.merge(result);
            job = next;
        }

        Ok((job, total))
    }
}

impl Default for PassChain {
    fn default() -> Self {
        Self::new()
    }
}
