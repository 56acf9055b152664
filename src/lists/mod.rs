//! Quantization-aware training op classification lists
//!
//! Three lists decide how an op type is treated:
//!
//! | List | Meaning |
//! |------|---------|
//! | Int8 | Op can compute on quantized inputs |
//! | ProduceFloat32 | Op must be forced back to full precision (empty by default) |
//! | Transparent | Op inherits the numeric domain of its input |
//!
//! Lists are plain values: build the defaults with [`int8_list`],
//! [`produce_float32_list`] and [`transparent_list`], or assemble custom ones
//! with [`QatList::from_ops`].

use indexmap::IndexSet;

use crate::error::{QatResult, TransformError};
use crate::registry::OpRegistry;

/// Default Int8-capable op types
pub const DEFAULT_INT8_OPS: &[&str] = &[
    "matmul",
    "batch_matmul",
    "conv2d",
    "avg_pool_2d",
    "max_pool_2d",
];

/// Default op types forced to float32
pub const DEFAULT_FP32_OPS: &[&str] = &[];

/// Default dtype-preserving op types
pub const DEFAULT_TRANSPARENT_OPS: &[&str] = &[
    "add_n",
    "bias_add",
    "multiply",
    "sigmoid",
    "tanh",
    "sqrt",
    "scalar_mul",
    "scalar_add",
    "broadcast_add",
    "broadcast_sub",
    "broadcast_mul",
    "broadcast_div",
    "layer_norm",
    "dropout",
    "softmax",
    "gelu",
    "normalization",
    "normalization_add_relu",
    "gather",
    "reshape",
    "relu",
    "transpose",
    "random_mask_like",
    "concat",
    "pad",
    "same_padding",
];

/// Immutable ordered set of op type names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QatList {
    op_types: IndexSet<String>,
}

impl QatList {
    /// Build a list from op type names (duplicates collapse)
    pub fn from_ops(op_types: &[&str]) -> Self {
        Self {
            op_types: op_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check membership
    pub fn contains(&self, op_type: &str) -> bool {
        self.op_types.contains(op_type)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.op_types.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.op_types.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.op_types.iter().map(|s| s.as_str())
    }

    /// Fail if any entry is unknown to `registry`
    pub fn verify(&self, list_name: &'static str, registry: &OpRegistry) -> QatResult<()> {
        match self.iter().find(|op_type| !registry.contains(op_type)) {
            Some(op_type) => Err(TransformError::UnregisteredOpType {
                list: list_name,
                op_type: op_type.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Default Int8 list
pub fn int8_list() -> QatList {
    QatList::from_ops(DEFAULT_INT8_OPS)
}

/// Default ProduceFloat32 list (empty)
pub fn produce_float32_list() -> QatList {
    QatList::from_ops(DEFAULT_FP32_OPS)
}

/// Default Transparent list
pub fn transparent_list() -> QatList {
    QatList::from_ops(DEFAULT_TRANSPARENT_OPS)
}
