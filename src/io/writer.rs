//! Job writer
//!
//! Save jobs to files or bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prost::Message;

use crate::error::{QatResult, TransformError};
use crate::proto::JobProto;

fn with_path(path: &Path, action: &str, e: std::io::Error) -> TransformError {
    TransformError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {} '{}': {}", action, path.display(), e),
    ))
}

/// Save a job to a file
///
/// # Example
///
/// ```ignore
/// use qat_rewriter::io::save_job;
///
/// save_job(&job, "train.qat.pb")?;
/// ```
pub fn save_job<P: AsRef<Path>>(job: &JobProto, path: P) -> QatResult<()> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|e| with_path(path, "create file", e))?;

    let mut writer = BufWriter::new(file);
    let bytes = job.encode_to_vec();

    writer
        .write_all(&bytes)
        .map_err(|e| with_path(path, "write file", e))?;

    writer
        .flush()
        .map_err(|e| with_path(path, "flush file", e))?;

    Ok(())
}

/// Encode a job to bytes
pub fn job_to_bytes(job: &JobProto) -> Vec<u8> {
    job.encode_to_vec()
}

/// Calculate the size of an encoded job in bytes
pub fn job_size(job: &JobProto) -> usize {
    job.encoded_len()
}
