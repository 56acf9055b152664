//! Quantization-aware training configuration

#![allow(missing_docs)]

use crate::error::QatResult;
use crate::lists::{int8_list, produce_float32_list, transparent_list, QatList};
use crate::proto::DataType;
use crate::registry::OpRegistry;

/// Lists and data type the pass works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QatConfig {
    /// Op types that compute on quantized inputs
    pub int8_list: QatList,
    /// Op types forced back to full precision
    pub produce_float32_list: QatList,
    /// Op types that inherit the numeric domain of their input
    pub transparent_list: QatList,
    /// Data type the job must declare and the only one that gets quantized
    pub expected_data_type: DataType,
}

impl Default for QatConfig {
    fn default() -> Self {
        Self {
            int8_list: int8_list(),
            produce_float32_list: produce_float32_list(),
            transparent_list: transparent_list(),
            expected_data_type: DataType::Float,
        }
    }
}

impl QatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int8_list(mut self, list: QatList) -> Self {
        self.int8_list = list;
        self
    }

    pub fn with_produce_float32_list(mut self, list: QatList) -> Self {
        self.produce_float32_list = list;
        self
    }

    pub fn with_transparent_list(mut self, list: QatList) -> Self {
        self.transparent_list = list;
        self
    }

    pub fn with_expected_data_type(mut self, data_type: DataType) -> Self {
        self.expected_data_type = data_type;
        self
    }

    /// Check every list entry against `registry`
    pub fn verify(&self, registry: &OpRegistry) -> QatResult<()> {
        self.int8_list.verify("Int8", registry)?;
        self.produce_float32_list.verify("ProduceFloat32", registry)?;
        self.transparent_list.verify("Transparent", registry)
    }

    /// Op type may sit inside a quantized chain
    pub fn is_int8_or_transparent(&self, op_type: &str) -> bool {
        self.int8_list.contains(op_type) || self.transparent_list.contains(op_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;

    #[test]
    fn test_default_config_verifies() {
        let config = QatConfig::default();
        assert_eq!(config.expected_data_type, DataType::Float);
        assert!(config.verify(&OpRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_custom_list_must_be_registered() {
        let config = QatConfig::new().with_transparent_list(QatList::from_ops(&["my_op"]));
        let err = config.verify(&OpRegistry::builtin()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnregisteredOpType { list: "Transparent", .. }
        ));

        let mut registry = OpRegistry::builtin();
        registry.register("my_op");
        assert!(config.verify(&registry).is_ok());
    }

    #[test]
    fn test_is_int8_or_transparent() {
        let config = QatConfig::default();
        assert!(config.is_int8_or_transparent("conv2d"));
        assert!(config.is_int8_or_transparent("relu"));
        assert!(!config.is_int8_or_transparent("identity"));
    }
}
