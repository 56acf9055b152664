//! Job validation
//!
//! Validate jobs for structural correctness before and after rewriting.

use rustc_hash::FxHashSet;

use crate::error::{QatResult, TransformError};
use crate::proto::extensions::split_lbn;
use crate::proto::{DataType, JobProto};
use crate::registry::OpRegistry;

/// Validation result with detailed issues
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the job is valid
    pub is_valid: bool,
    /// List of errors (critical issues)
    pub errors: Vec<String>,
    /// List of warnings (non-critical issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merge with another result
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Validation options
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Registry user-op types are looked up in
    pub registry: OpRegistry,
    /// Strict mode (warnings become errors)
    pub strict: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            registry: OpRegistry::builtin(),
            strict: false,
        }
    }
}

/// Validate a job against the builtin registry
///
/// Errors:
/// - empty or duplicate operator names, operators without a type
/// - blobs produced twice, inputs that are malformed or have no producer
/// - operators missing from every placement group
///
/// Warnings:
/// - invalid default data type, produced blobs without a declared descriptor
/// - user-op types unknown to the registry, empty job
pub fn validate_job(job: &JobProto) -> ValidationResult {
    validate_job_with_options(job, &ValidationOptions::default())
}

/// Validate with options
pub fn validate_job_with_options(job: &JobProto, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if DataType::try_from(job.default_data_type).map_or(true, |dt| dt == DataType::Invalid) {
        result.add_warning(format!(
            "Job '{}' declares invalid default data type {}",
            job.name, job.default_data_type
        ));
    }

    if job.op.is_empty() {
        result.add_warning("Job is empty (no operators)");
    }

    // Names and produced blobs
    let mut op_names: FxHashSet<&str> = FxHashSet::default();
    let mut produced: FxHashSet<String> = FxHashSet::default();

    for (idx, op) in job.op.iter().enumerate() {
        if op.name.is_empty() {
            result.add_error(format!("Operator {} has empty name", idx));
        } else if !op_names.insert(&op.name) {
            result.add_error(format!("Duplicate operator name '{}'", op.name));
        }

        if op.op_type.is_none() {
            result.add_error(format!("Operator '{}' has no op type", op.name));
        }

        if let Some(conf) = op.user_conf() {
            if !options.registry.contains(&conf.op_type_name) {
                result.add_warning(format!(
                    "Operator '{}': op type '{}' is not registered",
                    op.name, conf.op_type_name
                ));
            }
        }

        for lbn in op.output_lbns() {
            if !job.logical_blob_desc.contains_key(&lbn) {
                result.add_warning(format!("No blob desc declared for '{}'", lbn));
            }
            if !produced.insert(lbn.clone()) {
                result.add_error(format!(
                    "Duplicate producer of '{}' in operator '{}'",
                    lbn, op.name
                ));
            }
        }
    }

    // Inputs and placement
    let placed: FxHashSet<&str> = job
        .placement
        .iter()
        .flat_map(|g| g.op_name.iter().map(String::as_str))
        .collect();

    for op in &job.op {
        for (ibn, lbn) in op.input_bindings() {
            if split_lbn(lbn).is_err() {
                result.add_error(format!(
                    "Operator '{}': input '{}' has malformed blob name '{}'",
                    op.name, ibn, lbn
                ));
            } else if !produced.contains(lbn) {
                result.add_error(format!(
                    "Operator '{}' ({}): input '{}' reads '{}' which is not produced",
                    op.name,
                    op.op_type_name(),
                    ibn,
                    lbn
                ));
            }
        }

        if !op.name.is_empty() && !placed.contains(op.name.as_str()) {
            result.add_error(format!("Operator '{}' has no placement", op.name));
        }
    }

    if options.strict {
        // Convert warnings to errors
        for warning in std::mem::take(&mut result.warnings) {
            result.add_error(warning);
        }
    }

    result
}

/// Quick validation that returns an error if invalid
pub fn check_job(job: &JobProto) -> QatResult<()> {
    let result = validate_job(job);
    if result.is_valid {
        Ok(())
    } else {
        Err(TransformError::ValidationFailed(result.errors.join("; ")))
    }
}
