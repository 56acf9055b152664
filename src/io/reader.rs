//! Job reader
//!
//! Load jobs from files or bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;

use crate::error::{QatResult, TransformError};
use crate::proto::{DataType, JobProto};

fn with_path(path: &Path, action: &str, e: std::io::Error) -> TransformError {
    TransformError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {} '{}': {}", action, path.display(), e),
    ))
}

/// Load a job from a file path
///
/// # Example
///
/// ```ignore
/// use qat_rewriter::io::load_job;
///
/// let job = load_job("train.job.pb")?;
/// println!("Job {} has {} ops", job.name, job.op.len());
/// ```
pub fn load_job<P: AsRef<Path>>(path: P) -> QatResult<JobProto> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| with_path(path, "open file", e))?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();

    reader
        .read_to_end(&mut buffer)
        .map_err(|e| with_path(path, "read file", e))?;

    load_job_from_bytes(&buffer)
}

/// Load a job from bytes
pub fn load_job_from_bytes(bytes: &[u8]) -> QatResult<JobProto> {
    Ok(JobProto::decode(bytes)?)
}

/// Job metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job name
    pub name: String,
    /// Declared default data type
    pub default_data_type: DataType,
    /// Number of operators
    pub op_count: usize,
    /// Number of user operators
    pub user_op_count: usize,
    /// Number of job inputs
    pub input_count: usize,
    /// Number of variables
    pub variable_count: usize,
    /// Number of placement groups
    pub placement_groups: usize,
    /// Number of declared blob descriptors
    pub blob_desc_count: usize,
}

impl JobInfo {
    /// Extract metadata from a job
    pub fn from_job(job: &JobProto) -> Self {
        let count = |op_type: &str| job.op.iter().filter(|op| op.op_type_name() == op_type).count();

        Self {
            name: job.name.clone(),
            default_data_type: job.default_data_type(),
            op_count: job.op.len(),
            user_op_count: job.op.iter().filter(|op| op.is_user_op()).count(),
            input_count: count(crate::proto::extensions::INPUT_OP_TYPE),
            variable_count: count(crate::proto::extensions::VARIABLE_OP_TYPE),
            placement_groups: job.placement.len(),
            blob_desc_count: job.logical_blob_desc.len(),
        }
    }
}

/// Get job information from a file
pub fn get_job_info<P: AsRef<Path>>(path: P) -> QatResult<JobInfo> {
    let job = load_job(path)?;
    Ok(JobInfo::from_job(&job))
}
