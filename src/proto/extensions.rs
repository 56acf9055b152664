//! Extension methods for job protobuf types
//!
//! Provides convenient helper methods for working with job protobuf types,
//! plus the blob naming scheme shared by the graph view and the rewriter.

use crate::error::{QatResult, TransformError};

use super::job::operator_conf::OpType;
use super::job::*;

/// Op type reported for job input placeholders
pub const INPUT_OP_TYPE: &str = "input";
/// Op type reported for variables
pub const VARIABLE_OP_TYPE: &str = "variable";

// ============================================================================
// Blob names
// ============================================================================

/// Build a logical blob name from an op name and one of its output blob names
pub fn gen_lbn(op_name: &str, bn: &str) -> String {
    format!("{}/{}", op_name, bn)
}

/// Split a logical blob name into `(op_name, bn)`
pub fn split_lbn(lbn: &str) -> QatResult<(&str, &str)> {
    match lbn.split_once('/') {
        Some((op, bn)) if !op.is_empty() && !bn.is_empty() => Ok((op, bn)),
        _ => Err(TransformError::InvalidBlobName(lbn.to_string())),
    }
}

/// Build an indexed blob name such as `in_0`
pub fn gen_bn(arg: &str, index: usize) -> String {
    format!("{}_{}", arg, index)
}

/// Split an indexed blob name such as `in_1` into `("in", 1)`
pub fn parse_bn(bn: &str) -> QatResult<(&str, usize)> {
    bn.rsplit_once('_')
        .filter(|(arg, _)| !arg.is_empty())
        .and_then(|(arg, idx)| idx.parse::<usize>().ok().map(|i| (arg, i)))
        .ok_or_else(|| TransformError::InvalidBlobName(bn.to_string()))
}

// ============================================================================
// DataType extensions
// ============================================================================

impl DataType {
    /// Size in bytes of one element, `None` for `Invalid`
    pub fn size_of(self) -> Option<usize> {
        match self {
            DataType::Char | DataType::Int8 | DataType::Uint8 => Some(1),
            DataType::Float16 => Some(2),
            DataType::Float | DataType::Int32 => Some(4),
            DataType::Double | DataType::Int64 => Some(8),
            DataType::Invalid => None,
        }
    }

    /// Check if data type is floating point
    pub fn is_floating_point(self) -> bool {
        matches!(self, DataType::Float | DataType::Double | DataType::Float16)
    }
}

// ============================================================================
// OperatorConf extensions
// ============================================================================

impl OperatorConf {
    /// User op conf, if this is a user op
    pub fn user_conf(&self) -> Option<&UserOpConf> {
        match &self.op_type {
            Some(OpType::UserConf(conf)) => Some(conf),
            _ => None,
        }
    }

    /// Mutable user op conf, if this is a user op
    pub fn user_conf_mut(&mut self) -> Option<&mut UserOpConf> {
        match &mut self.op_type {
            Some(OpType::UserConf(conf)) => Some(conf),
            _ => None,
        }
    }

    /// Check if this is a registry-backed user op
    pub fn is_user_op(&self) -> bool {
        self.user_conf().is_some()
    }

    /// Op type name (`input`/`variable` for system ops, empty when unset)
    pub fn op_type_name(&self) -> &str {
        match &self.op_type {
            Some(OpType::UserConf(conf)) => &conf.op_type_name,
            Some(OpType::InputConf(_)) => INPUT_OP_TYPE,
            Some(OpType::VariableConf(_)) => VARIABLE_OP_TYPE,
            None => "",
        }
    }

    /// All `(ibn, lbn)` input bindings in argument order
    pub fn input_bindings(&self) -> Vec<(String, &str)> {
        let Some(conf) = self.user_conf() else {
            return Vec::new();
        };
        conf.input
            .iter()
            .flat_map(|(arg, list)| {
                list.s
                    .iter()
                    .enumerate()
                    .map(move |(i, lbn)| (gen_bn(arg, i), lbn.as_str()))
            })
            .collect()
    }

    /// All logical blob names produced by this op
    pub fn output_lbns(&self) -> Vec<String> {
        match &self.op_type {
            Some(OpType::UserConf(conf)) => conf
                .output
                .values()
                .flat_map(|list| list.s.iter().cloned())
                .collect(),
            Some(OpType::InputConf(conf)) => vec![gen_lbn(&self.name, &conf.out)],
            Some(OpType::VariableConf(conf)) => vec![gen_lbn(&self.name, &conf.out)],
            None => Vec::new(),
        }
    }

    /// Rebind input `ibn` to `new_lbn`, returning the lbn it was bound to
    pub fn replace_input_lbn(&mut self, ibn: &str, new_lbn: &str) -> QatResult<String> {
        let (arg, index) = parse_bn(ibn)?;
        let op_name = self.name.clone();
        let conf = self
            .user_conf_mut()
            .ok_or_else(|| TransformError::UnknownOp(format!("{} is not a user op", op_name)))?;
        let slot = conf
            .input
            .get_mut(arg)
            .and_then(|list| list.s.get_mut(index))
            .ok_or_else(|| TransformError::InvalidBlobName(format!("{}/{}", op_name, ibn)))?;
        Ok(std::mem::replace(slot, new_lbn.to_string()))
    }
}

// ============================================================================
// BlobDescProto extensions
// ============================================================================

impl BlobDescProto {
    /// Create a descriptor
    pub fn new(shape: &[i64], data_type: DataType) -> Self {
        Self {
            shape: shape.to_vec(),
            data_type: data_type as i32,
        }
    }
}

// ============================================================================
// ParallelConf extensions
// ============================================================================

impl ParallelConf {
    /// Create a placement on `device_tag` covering `device_names`
    pub fn new(device_tag: &str, device_names: &[&str]) -> Self {
        Self {
            device_tag: device_tag.to_string(),
            device_name: device_names.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// JobProto extensions
// ============================================================================

impl JobProto {
    /// Find an operator by name
    pub fn find_op(&self, name: &str) -> Option<&OperatorConf> {
        self.op.iter().find(|op| op.name == name)
    }

    /// Placement of an operator, if any group covers it
    pub fn placement_of(&self, op_name: &str) -> Option<&ParallelConf> {
        self.placement
            .iter()
            .find(|g| g.op_name.iter().any(|n| n == op_name))
            .and_then(|g| g.parallel_conf.as_ref())
    }

    /// Declare or overwrite the element type of a logical blob
    pub fn set_blob_data_type(&mut self, lbn: &str, data_type: DataType) {
        self.logical_blob_desc
            .entry(lbn.to_string())
            .or_default()
            .set_data_type(data_type);
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Create a user op whose inputs all bind to argument `in` and which
/// produces a single output `<name>/out_0`
pub fn make_user_op(name: &str, op_type: &str, inputs: &[&str]) -> OperatorConf {
    let mut conf = UserOpConf {
        op_type_name: op_type.to_string(),
        ..Default::default()
    };
    if !inputs.is_empty() {
        conf.input.insert(
            "in".to_string(),
            ListString {
                s: inputs.iter().map(|s| s.to_string()).collect(),
            },
        );
    }
    conf.output.insert(
        "out".to_string(),
        ListString {
            s: vec![gen_lbn(name, &gen_bn("out", 0))],
        },
    );
    OperatorConf {
        name: name.to_string(),
        op_type: Some(OpType::UserConf(conf)),
    }
}

/// Create a float32 job input producing `<name>/out`
pub fn make_input_op(name: &str, shape: &[i64]) -> OperatorConf {
    OperatorConf {
        name: name.to_string(),
        op_type: Some(OpType::InputConf(InputOpConf {
            out: "out".to_string(),
            blob_conf: Some(BlobDescProto::new(shape, DataType::Float)),
        })),
    }
}

/// Create a float32 variable producing `<name>/out`
pub fn make_variable_op(name: &str, shape: &[i64]) -> OperatorConf {
    OperatorConf {
        name: name.to_string(),
        op_type: Some(OpType::VariableConf(VariableOpConf {
            out: "out".to_string(),
            shape: shape.to_vec(),
            data_type: DataType::Float as i32,
        })),
    }
}

/// Assemble a float32 job placing every op on one CPU device and declaring
/// a float32 blob desc for every produced blob
pub fn make_job(name: &str, ops: Vec<OperatorConf>) -> JobProto {
    let mut job = JobProto {
        name: name.to_string(),
        default_data_type: DataType::Float as i32,
        ..Default::default()
    };

    for op in &ops {
        let shape = match &op.op_type {
            Some(OpType::InputConf(conf)) => conf
                .blob_conf
                .as_ref()
                .map(|b| b.shape.clone())
                .unwrap_or_default(),
            Some(OpType::VariableConf(conf)) => conf.shape.clone(),
            _ => Vec::new(),
        };
        for lbn in op.output_lbns() {
            job.logical_blob_desc
                .insert(lbn, BlobDescProto::new(&shape, DataType::Float));
        }
    }

    job.placement.push(PlacementGroup {
        op_name: ops.iter().map(|op| op.name.clone()).collect(),
        parallel_conf: Some(ParallelConf::new("cpu", &["0:0"])),
    });
    job.op = ops;
    job
}
