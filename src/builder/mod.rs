//! Job builder module
//!
//! This module provides the write side of a pass:
//!
//! - [`JobBuilder`]: Appends operators and replaces existing ones, each at most once
//! - [`UserOpBuilder`]: Fluent builder for new user operator confs
//!
//! # Overview
//!
//! A pass reads an [`OpGraph`](crate::graph::OpGraph) and records every change
//! through a `JobBuilder` that owns a copy of the job. The graph itself is
//! never mutated.
//!
//! # Example
//!
//! ```ignore
//! use qat_rewriter::builder::{JobBuilder, UserOpBuilder};
//!
//! let mut builder = JobBuilder::new(job)?;
//!
//! let marker = UserOpBuilder::new("conv-out_0-fake-quant")
//!     .op("identity")
//!     .input("in", "conv/out_0")
//!     .output("out")
//!     .build()?;
//! builder.add_ops(&parallel_conf, vec![marker])?;
//!
//! let job = builder.build();
//! ```

pub mod job;
pub mod user_op;

// Re-export main types
pub use job::JobBuilder;
pub use user_op::UserOpBuilder;
