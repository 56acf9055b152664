//! Quantization-aware training rewrite
//!
//! Inserts fake-quant markers on every edge that crosses between quantized and
//! full precision territory:
//!
//! 1. Compute the downstream white set: nodes reached from an Int8 node through
//!    an unbroken chain of Int8 or Transparent operators
//! 2. For each Int8 node mark incoming edges from outside the white set, and
//!    every outgoing edge of its inference output (`conv2d` fused with a
//!    following `relu` exits after the `relu`)
//! 3. Group marked edges by logical blob, add one identity marker per float
//!    blob and rebind every consumer to the marker output
//!
//! The pass never computes scales and never changes numerics. Markers are
//! placeholders for a later lowering stage.
//!
//! ```text
//! x -> conv2d -> relu -> matmul
//!
//! x -> [x-out-fake-quant] -> conv2d -> relu -> [relu-out_0-fake-quant] -> matmul
//! ```
//!
//! Running the pass on its own output is a no-op: edges next to a marker are
//! never selected and markers pass the numeric domain of their input through.

pub mod config;
pub mod insertion;
pub mod rewrite;
pub mod white_set;

#[cfg(test)]
mod proptests;

pub use config::QatConfig;
pub use insertion::select_marked_edges;
pub use rewrite::{fake_quant_op_name, is_fake_quant_marker, FAKE_QUANT_SUFFIX};
pub use white_set::{downstream_white_set, WhiteSet};

use crate::builder::JobBuilder;
use crate::error::{QatResult, TransformError};
use crate::graph::OpGraph;
use crate::registry::OpRegistry;
use crate::traits::JobPass;

use super::common::PassResult;

/// Fake-quant marker insertion pass
#[derive(Debug, Clone)]
pub struct QuantAwareTraining {
    /// Lists and expected data type
    pub config: QatConfig,
    /// Registry the lists are verified against
    pub registry: OpRegistry,
}

impl Default for QuantAwareTraining {
    fn default() -> Self {
        Self {
            config: QatConfig::default(),
            registry: OpRegistry::builtin(),
        }
    }
}

impl QuantAwareTraining {
    /// Pass with the default lists and the builtin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: QatConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the registry
    pub fn with_registry(mut self, registry: OpRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl JobPass for QuantAwareTraining {
    fn name(&self) -> &'static str {
        "QuantAwareTraining"
    }

    #[tracing::instrument(name = "quant_aware_training", skip_all, fields(job = graph.name()))]
    fn apply(&self, graph: &OpGraph, builder: &mut JobBuilder) -> QatResult<PassResult> {
        let actual = graph.default_data_type();
        if actual != self.config.expected_data_type {
            return Err(TransformError::DataTypeMismatch {
                expected: self.config.expected_data_type,
                actual,
            });
        }
        self.config.verify(&self.registry)?;

        let white = downstream_white_set(graph, &self.config)?;
        let marked = select_marked_edges(graph, &self.config, &white);

        let mut result = PassResult {
            white_set_size: white.len(),
            edges_marked: marked.len(),
            ..PassResult::new()
        };
        rewrite::insert_fake_quant_ops(
            graph,
            &marked,
            self.config.expected_data_type,
            builder,
            &mut result,
        )?;

        tracing::debug!(
            white = result.white_set_size,
            marked = result.edges_marked,
            markers = result.markers_inserted(),
            skipped = result.groups_skipped,
            "fake quant inserted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::lists::QatList;
    use crate::proto::extensions::{make_input_op, make_job, make_user_op, make_variable_op};
    use crate::proto::{DataType, JobProto, ParallelConf, PlacementGroup};
    use crate::transformers::common::run_pass;

    fn run(job: JobProto) -> QatResult<(JobProto, PassResult)> {
        run_pass(job, &QuantAwareTraining::new())
    }

    fn input_of(job: &JobProto, op: &str, slot: usize) -> String {
        job.find_op(op).unwrap().input_bindings()[slot].1.to_string()
    }

    fn make_conv_relu_matmul() -> JobProto {
        make_job(
            "conv_relu_matmul",
            vec![
                make_input_op("x", &[1, 3, 8, 8]),
                make_user_op("a", "conv2d", &["x/out"]),
                make_user_op("b", "relu", &["a/out_0"]),
                make_user_op("c", "matmul", &["b/out_0"]),
            ],
        )
    }

    #[test]
    fn test_conv_relu_matmul() {
        let (job, result) = run(make_conv_relu_matmul()).unwrap();

        assert_eq!(result.markers, vec!["x-out-fake-quant", "b-out_0-fake-quant"]);
        assert_eq!(job.op.len(), 6);

        assert_eq!(input_of(&job, "a", 0), "x-out-fake-quant/out_0");
        assert_eq!(input_of(&job, "b", 0), "a/out_0");
        assert_eq!(input_of(&job, "c", 0), "b-out_0-fake-quant/out_0");

        let marker = job.find_op("b-out_0-fake-quant").unwrap();
        assert!(is_fake_quant_marker(marker));
        assert_eq!(marker.input_bindings()[0].1, "b/out_0");
    }

    #[test]
    fn test_transparent_reentry() {
        let job = make_job(
            "reentry",
            vec![
                make_input_op("x", &[4, 4]),
                make_user_op("cast", "cast", &["x/out"]),
                make_user_op("softmax", "softmax", &["cast/out_0"]),
                make_user_op("mm", "matmul", &["softmax/out_0"]),
            ],
        );

        let (job, result) = run(job).unwrap();
        assert_eq!(result.markers, vec!["softmax-out_0-fake-quant"]);
        assert_eq!(input_of(&job, "mm", 0), "softmax-out_0-fake-quant/out_0");
        assert_eq!(input_of(&job, "softmax", 0), "cast/out_0");
    }

    #[test]
    fn test_transparent_inside_white_chain() {
        let job = make_job(
            "white_chain",
            vec![
                make_input_op("x", &[4, 4]),
                make_user_op("mm1", "matmul", &["x/out"]),
                make_user_op("softmax", "softmax", &["mm1/out_0"]),
                make_user_op("mm2", "matmul", &["softmax/out_0"]),
            ],
        );

        let (job, result) = run(job).unwrap();
        assert_eq!(result.markers, vec!["x-out-fake-quant", "mm1-out_0-fake-quant"]);
        // softmax is white, mm2 reads it directly
        assert_eq!(input_of(&job, "mm2", 0), "softmax/out_0");
    }

    #[test]
    fn test_empty_job() {
        let (job, result) = run(make_job("empty", vec![])).unwrap();
        assert!(job.op.is_empty());
        assert_eq!(result, PassResult::new());
    }

    #[test]
    fn test_job_without_int8_ops_is_unchanged() {
        let job = make_job(
            "plain",
            vec![
                make_input_op("x", &[4]),
                make_user_op("tanh", "tanh", &["x/out"]),
            ],
        );

        let (rewritten, result) = run(job.clone()).unwrap();
        assert!(!result.changed());
        assert_eq!(rewritten, job);
    }

    #[test]
    fn test_consumer_with_two_marked_inputs() {
        let job = make_job(
            "weights",
            vec![
                make_input_op("x", &[4, 4]),
                make_variable_op("w", &[4, 4]),
                make_user_op("mm", "matmul", &["x/out", "w/out"]),
            ],
        );

        let (job, result) = run(job).unwrap();
        assert_eq!(result.markers_inserted(), 2);
        assert_eq!(result.consumers_rewritten, 1);
        assert_eq!(input_of(&job, "mm", 0), "x-out-fake-quant/out_0");
        assert_eq!(input_of(&job, "mm", 1), "w-out-fake-quant/out_0");
    }

    #[test]
    fn test_shared_blob_gets_one_marker() {
        let job = make_job(
            "shared",
            vec![
                make_input_op("x", &[4, 4]),
                make_user_op("mm1", "matmul", &["x/out"]),
                make_user_op("mm2", "matmul", &["x/out"]),
                make_user_op("tanh", "tanh", &["x/out"]),
            ],
        );

        let (job, result) = run(job).unwrap();
        assert_eq!(result.markers, vec!["x-out-fake-quant"]);
        assert_eq!(input_of(&job, "mm1", 0), "x-out-fake-quant/out_0");
        assert_eq!(input_of(&job, "mm2", 0), "x-out-fake-quant/out_0");
        // tanh is not Int8, its input stays full precision
        assert_eq!(input_of(&job, "tanh", 0), "x/out");
    }

    #[test]
    fn test_marker_inherits_producer_placement() {
        let mut job = make_conv_relu_matmul();
        let gpu = ParallelConf::new("gpu", &["0:0"]);
        job.placement[0].op_name.retain(|n| n != "b");
        job.placement.push(PlacementGroup {
            op_name: vec!["b".to_string()],
            parallel_conf: Some(gpu.clone()),
        });

        let (job, _) = run(job).unwrap();
        assert_eq!(job.placement_of("b-out_0-fake-quant"), Some(&gpu));
        assert_eq!(
            job.placement_of("x-out-fake-quant").unwrap().device_tag,
            "cpu"
        );
    }

    #[test]
    fn test_non_float_blob_skipped() {
        let mut job = make_conv_relu_matmul();
        job.set_blob_data_type("x/out", DataType::Int8);

        let (job, result) = run(job).unwrap();
        assert_eq!(result.groups_skipped, 1);
        assert_eq!(result.markers, vec!["b-out_0-fake-quant"]);
        assert_eq!(input_of(&job, "a", 0), "x/out");
    }

    #[test]
    fn test_idempotent() {
        let (once, first) = run(make_conv_relu_matmul()).unwrap();
        let (twice, second) = run(once.clone()).unwrap();

        assert_eq!(first.markers_inserted(), 2);
        assert!(!second.changed());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_data_type_mismatch() {
        let mut job = make_conv_relu_matmul();
        job.set_default_data_type(DataType::Double);

        let err = run(job).unwrap_err();
        assert!(matches!(
            err,
            TransformError::DataTypeMismatch {
                expected: DataType::Float,
                actual: DataType::Double
            }
        ));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_unregistered_list_entry() {
        let pass = QuantAwareTraining::new()
            .with_config(QatConfig::new().with_int8_list(QatList::from_ops(&["conv3d"])));

        let err = run_pass(make_conv_relu_matmul(), &pass).unwrap_err();
        assert!(matches!(err, TransformError::UnregisteredOpType { .. }));
    }

    #[test]
    fn test_custom_lists() {
        let mut registry = OpRegistry::builtin();
        registry.register("my_conv");
        let pass = QuantAwareTraining::new()
            .with_registry(registry)
            .with_config(QatConfig::new().with_int8_list(QatList::from_ops(&["my_conv"])));

        let job = make_job(
            "custom",
            vec![
                make_input_op("x", &[4]),
                make_user_op("c", "my_conv", &["x/out"]),
                make_user_op("mm", "matmul", &["c/out_0"]),
            ],
        );

        let (_, result) = run_pass(job, &pass).unwrap();
        // matmul is not Int8 under this config
        assert_eq!(result.markers, vec!["x-out-fake-quant", "c-out_0-fake-quant"]);
    }

    #[test]
    fn test_multi_blob_edge_rejected() {
        let mut split = make_user_op("split", "split", &["x/out"]);
        split
            .user_conf_mut()
            .unwrap()
            .output
            .get_mut("out")
            .unwrap()
            .s
            .push("split/out_1".to_string());
        let job = make_job(
            "split",
            vec![
                make_input_op("x", &[4, 4]),
                split,
                make_user_op("mm", "matmul", &["split/out_0", "split/out_1"]),
            ],
        );

        let err = run(job).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedEdge(_)));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
