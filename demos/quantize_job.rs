//! Example: quantization-aware training rewrite
//!
//! Inserts fake-quant markers into a job and prints where they went.
//! Without arguments a small conv/relu/matmul job is built in memory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example quantize_job
//! cargo run --example quantize_job -- train.job.pb train.qat.pb
//! cargo run --example quantize_job -- train.job.pb --info
//! ```

use std::env;

use qat_rewriter::io::{get_job_info, rewrite_job, validate_job};
use qat_rewriter::prelude::*;
use qat_rewriter::proto::extensions::{make_input_op, make_job, make_user_op, make_variable_op};

fn demo_job() -> JobProto {
    make_job(
        "demo",
        vec![
            make_input_op("image", &[1, 3, 32, 32]),
            make_variable_op("conv_weight", &[16, 3, 3, 3]),
            make_user_op("conv", "conv2d", &["image/out", "conv_weight/out"]),
            make_user_op("relu", "relu", &["conv/out_0"]),
            make_user_op("pool", "max_pool_2d", &["relu/out_0"]),
            make_user_op("flatten", "reshape", &["pool/out_0"]),
            make_variable_op("fc_weight", &[4096, 10]),
            make_user_op("fc", "matmul", &["flatten/out_0", "fc_weight/out"]),
            make_user_op("softmax", "softmax", &["fc/out_0"]),
        ],
    )
}

fn main() -> QatResult<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .try_init();

    let args: Vec<String> = env::args().collect();
    let input_path = args.get(1).filter(|a| !a.starts_with("--"));
    let output_path = args.get(2).filter(|a| !a.starts_with("--"));

    if args.contains(&"--info".to_string()) {
        let Some(input_path) = input_path else {
            eprintln!("Usage: {} <input.pb> --info", args[0]);
            std::process::exit(1);
        };
        let info = get_job_info(input_path)?;
        println!("Job Information:");
        println!("  Name: {}", info.name);
        println!("  Default data type: {:?}", info.default_data_type);
        println!("  Operators: {} ({} user ops)", info.op_count, info.user_op_count);
        println!("  Inputs: {}", info.input_count);
        println!("  Variables: {}", info.variable_count);
        println!("  Placement groups: {}", info.placement_groups);
        return Ok(());
    }

    let job = match input_path {
        Some(path) => load_job(path)?,
        None => demo_job(),
    };

    let validation = validate_job(&job);
    for warn in &validation.warnings {
        println!("warning: {}", warn);
    }

    let (rewritten, stats) = rewrite_job(&job, &RewriteOptions::default())?;

    println!("Job '{}':", rewritten.name);
    println!("  Operators: {} -> {}", stats.original_ops, stats.rewritten_ops);
    println!("  Downstream white: {} nodes", stats.pass.white_set_size);
    println!("  Marked edges: {}", stats.pass.edges_marked);
    println!("  Consumers rewritten: {}", stats.pass.consumers_rewritten);
    println!("  Markers:");
    for name in &stats.pass.markers {
        let source = rewritten
            .find_op(name)
            .and_then(|op| op.input_bindings().first().map(|(_, lbn)| lbn.to_string()))
            .unwrap_or_default();
        println!("    {} <- {}", name, source);
    }

    if let Some(path) = output_path {
        save_job(&rewritten, path)?;
        println!("Saved to {}", path);
    }

    Ok(())
}
