//! Property tests over random float DAGs

use indexmap::IndexSet;
use proptest::prelude::*;
use proptest::sample::Index;
use rustc_hash::FxHashSet;

use super::*;
use crate::proto::extensions::{make_input_op, make_job, make_user_op, make_variable_op, split_lbn};
use crate::proto::JobProto;
use crate::transformers::common::run_pass;

const OP_POOL: &[&str] = &[
    "conv2d",
    "matmul",
    "max_pool_2d",
    "relu",
    "softmax",
    "add_n",
    "tanh",
    "reshape",
    "cast",
];

/// Each entry is one user op: its type and the earlier blobs it reads.
/// Inputs come from distinct producers, so every edge carries one blob.
fn build_job(layout: &[(usize, Vec<Index>)]) -> JobProto {
    let mut ops = vec![make_input_op("x", &[4, 4]), make_variable_op("w", &[4, 4])];
    let mut lbns = vec!["x/out".to_string(), "w/out".to_string()];

    for (i, (op_idx, picks)) in layout.iter().enumerate() {
        let inputs: IndexSet<String> = picks
            .iter()
            .map(|pick| lbns[pick.index(lbns.len())].clone())
            .collect();
        let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();

        let name = format!("n{}", i);
        ops.push(make_user_op(&name, OP_POOL[*op_idx], &inputs));
        lbns.push(format!("{}/out_0", name));
    }

    make_job("random", ops)
}

fn layout_strategy() -> impl Strategy<Value = Vec<(usize, Vec<Index>)>> {
    prop::collection::vec(
        (0..OP_POOL.len(), prop::collection::vec(any::<Index>(), 1..4)),
        0..16,
    )
}

fn producer(lbn: &str) -> &str {
    split_lbn(lbn).unwrap().0
}

/// Fixpoint over job order, which is topological for generated jobs
fn reference_white_set(job: &JobProto, config: &QatConfig) -> FxHashSet<String> {
    let mut white = FxHashSet::default();
    for op in &job.op {
        if !op.is_user_op() || !config.is_int8_or_transparent(op.op_type_name()) {
            continue;
        }
        let fed = op.input_bindings().iter().any(|(_, lbn)| {
            let father = producer(lbn);
            let father_type = job.find_op(father).unwrap().op_type_name();
            config.int8_list.contains(father_type) || white.contains(father)
        });
        if fed {
            white.insert(op.name.clone());
        }
    }
    white
}

fn computed_white_set(job: &JobProto, config: &QatConfig) -> FxHashSet<String> {
    let graph = OpGraph::new(job).unwrap();
    downstream_white_set(&graph, config)
        .unwrap()
        .iter()
        .map(|id| graph.node(id).name().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_white_set_is_int8_reachability(layout in layout_strategy()) {
        let job = build_job(&layout);
        let config = QatConfig::default();
        prop_assert_eq!(computed_white_set(&job, &config), reference_white_set(&job, &config));
    }

    #[test]
    fn prop_int8_inputs_are_white_or_marked(layout in layout_strategy()) {
        let job = build_job(&layout);
        let config = QatConfig::default();
        let white = reference_white_set(&job, &config);

        let (rewritten, _) = run_pass(job.clone(), &QuantAwareTraining::new()).unwrap();

        for op in &job.op {
            if !config.int8_list.contains(op.op_type_name()) {
                continue;
            }
            let op = rewritten.find_op(&op.name).unwrap();
            for (_, lbn) in op.input_bindings() {
                let father = producer(lbn);
                let is_marker = is_fake_quant_marker(rewritten.find_op(father).unwrap());
                prop_assert!(is_marker || white.contains(father), "{} reads {}", op.name, lbn);
            }
        }
    }

    #[test]
    fn prop_one_marker_per_blob(layout in layout_strategy()) {
        let job = build_job(&layout);
        let (rewritten, result) = run_pass(job, &QuantAwareTraining::new()).unwrap();

        let markers: Vec<_> = rewritten.op.iter().filter(|op| is_fake_quant_marker(op)).collect();
        prop_assert_eq!(markers.len(), result.markers_inserted());

        let mut sources = FxHashSet::default();
        for marker in &markers {
            let bindings = marker.input_bindings();
            prop_assert_eq!(bindings.len(), 1);
            let source = bindings[0].1;
            prop_assert!(sources.insert(source.to_string()), "{} marked twice", source);

            // never chained, never orphaned
            prop_assert!(!is_fake_quant_marker(rewritten.find_op(producer(source)).unwrap()));
            let out = format!("{}/out_0", marker.name);
            prop_assert!(rewritten
                .op
                .iter()
                .any(|op| op.input_bindings().iter().any(|(_, lbn)| *lbn == out)));
        }
    }

    #[test]
    fn prop_rewrite_is_idempotent(layout in layout_strategy()) {
        let pass = QuantAwareTraining::new();
        let (once, _) = run_pass(build_job(&layout), &pass).unwrap();
        let (twice, second) = run_pass(once.clone(), &pass).unwrap();

        prop_assert!(!second.changed());
        prop_assert_eq!(once, twice);
    }
}
