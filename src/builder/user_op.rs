//! Fluent builder for user operator confs

use std::collections::BTreeMap;

use crate::error::{QatResult, TransformError};
use crate::proto::extensions::{gen_bn, gen_lbn};
use crate::proto::{operator_conf::OpType, ListString, OperatorConf, UserOpConf};

/// Builder for a user op conf
///
/// ```ignore
/// let op = UserOpBuilder::new("conv-out_0-fake-quant")
///     .op("identity")
///     .input("in", "conv/out_0")
///     .output("out")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct UserOpBuilder {
    name: String,
    op_type_name: String,
    input: BTreeMap<String, ListString>,
    output: BTreeMap<String, ListString>,
}

impl UserOpBuilder {
    /// Start a conf for an operator called `name`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Set the op type
    pub fn op(mut self, op_type_name: &str) -> Self {
        self.op_type_name = op_type_name.to_string();
        self
    }

    /// Append `lbn` to input argument `arg`
    pub fn input(mut self, arg: &str, lbn: &str) -> Self {
        self.input
            .entry(arg.to_string())
            .or_default()
            .s
            .push(lbn.to_string());
        self
    }

    /// Declare one more output under argument `arg`
    ///
    /// The n-th output of `arg` is addressed as `<name>/<arg>_<n>`.
    pub fn output(mut self, arg: &str) -> Self {
        let list = self.output.entry(arg.to_string()).or_default();
        let bn = gen_bn(arg, list.s.len());
        list.s.push(gen_lbn(&self.name, &bn));
        self
    }

    /// Finish the conf
    pub fn build(self) -> QatResult<OperatorConf> {
        if self.name.is_empty() || self.op_type_name.is_empty() {
            return Err(TransformError::Internal(format!(
                "user op needs a name and an op type, got '{}' of type '{}'",
                self.name, self.op_type_name
            )));
        }
        Ok(OperatorConf {
            name: self.name,
            op_type: Some(OpType::UserConf(UserOpConf {
                op_type_name: self.op_type_name,
                input: self.input,
                output: self.output,
            })),
        })
    }
}
