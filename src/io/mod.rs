//! Job I/O module
//!
//! This module provides functions for loading, saving, validating and
//! rewriting serialized jobs.
//!
//! # Example
//!
//! ```ignore
//! use qat_rewriter::io::{load_job, save_job, rewrite_file};
//!
//! // Load and save
//! let job = load_job("train.job.pb")?;
//! save_job(&job, "copy.job.pb")?;
//!
//! // One-shot rewrite
//! let stats = rewrite_file("train.job.pb", "train.qat.pb", Default::default())?;
//! println!("Inserted {} markers", stats.markers_inserted());
//! ```

pub mod reader;
pub mod validation;
pub mod writer;

// Re-exports
pub use reader::{get_job_info, load_job, load_job_from_bytes, JobInfo};
pub use validation::{
    check_job, validate_job, validate_job_with_options, ValidationOptions, ValidationResult,
};
pub use writer::{job_size, job_to_bytes, save_job};

use std::path::Path;

use crate::error::QatResult;
use crate::proto::JobProto;
use crate::transformers::{run_pass, PassResult, QatConfig, QuantAwareTraining};

/// Rewrite statistics
#[derive(Debug, Clone, Default)]
pub struct RewriteStats {
    /// Operator count before the rewrite
    pub original_ops: usize,
    /// Operator count after the rewrite
    pub rewritten_ops: usize,
    /// Encoded size before the rewrite
    pub original_size: usize,
    /// Encoded size after the rewrite
    pub rewritten_size: usize,
    /// Pass statistics
    pub pass: PassResult,
}

impl RewriteStats {
    /// Number of inserted markers
    pub fn markers_inserted(&self) -> usize {
        self.pass.markers_inserted()
    }

    /// Number of operators added by the rewrite
    pub fn ops_added(&self) -> usize {
        self.rewritten_ops.saturating_sub(self.original_ops)
    }
}

/// Rewrite options
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Validate before rewriting
    pub validate_input: bool,
    /// Validate after rewriting
    pub validate_output: bool,
    /// Pass configuration
    pub config: QatConfig,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            validate_input: true,
            validate_output: true,
            config: QatConfig::default(),
        }
    }
}

/// Rewrite a job in memory
pub fn rewrite_job(job: &JobProto, options: &RewriteOptions) -> QatResult<(JobProto, RewriteStats)> {
    if options.validate_input {
        check_job(job)?;
    }

    let original_ops = job.op.len();
    let original_size = job_size(job);

    let pass = QuantAwareTraining::new().with_config(options.config.clone());
    let (rewritten, pass_result) = run_pass(job.clone(), &pass)?;

    if options.validate_output {
        check_job(&rewritten)?;
    }

    let stats = RewriteStats {
        original_ops,
        rewritten_ops: rewritten.op.len(),
        original_size,
        rewritten_size: job_size(&rewritten),
        pass: pass_result,
    };

    Ok((rewritten, stats))
}

/// Rewrite a job file and save to another file
///
/// # Example
///
/// ```ignore
/// use qat_rewriter::io::{rewrite_file, RewriteOptions};
///
/// let stats = rewrite_file("train.job.pb", "train.qat.pb", RewriteOptions::default())?;
/// println!("{} ops -> {} ops", stats.original_ops, stats.rewritten_ops);
/// ```
pub fn rewrite_file<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output: P2,
    options: RewriteOptions,
) -> QatResult<RewriteStats> {
    let job = load_job(input)?;
    let (rewritten, stats) = rewrite_job(&job, &options)?;
    save_job(&rewritten, output)?;
    Ok(stats)
}
