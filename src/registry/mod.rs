//! Operator registry
//!
//! Records which user-op type names exist. Classification lists are checked
//! against it before the rewriter runs so that a renamed or removed operator
//! cannot silently drop out of a list.

use rustc_hash::FxHashSet;

use crate::lists::{DEFAULT_INT8_OPS, DEFAULT_TRANSPARENT_OPS};

/// Marker operators are plain identities
pub const IDENTITY_OP_TYPE: &str = "identity";

/// User ops known to the builtin registry besides the classification lists
pub const BUILTIN_EXTRA_OPS: &[&str] = &[
    IDENTITY_OP_TYPE,
    "cast",
    "reduce_sum",
    "reduce_mean",
    "leaky_relu",
    "flatten",
    "slice",
    "squeeze",
    "expand_dims",
    "upsample",
];

/// Registry of user-op type names
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    op_types: FxHashSet<String>,
}

impl OpRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every default list entry plus [`BUILTIN_EXTRA_OPS`]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for op_type in DEFAULT_INT8_OPS
            .iter()
            .chain(DEFAULT_TRANSPARENT_OPS)
            .chain(BUILTIN_EXTRA_OPS)
        {
            registry.register(op_type);
        }
        registry
    }

    /// Register an op type
    ///
    /// Returns `self` for method chaining.
    pub fn register(&mut self, op_type: &str) -> &mut Self {
        self.op_types.insert(op_type.to_string());
        self
    }

    /// Check if an op type is registered
    pub fn contains(&self, op_type: &str) -> bool {
        self.op_types.contains(op_type)
    }

    /// Number of registered op types
    pub fn len(&self) -> usize {
        self.op_types.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.op_types.is_empty()
    }

    /// Iterate over registered op type names (unordered)
    pub fn op_type_names(&self) -> impl Iterator<Item = &str> {
        self.op_types.iter().map(|s| s.as_str())
    }
}
