//! Job passes module
//!
//! This module provides ready-to-use rewriting passes:
//!
//! - **Quantization-aware training**: insert fake-quant markers around Int8 operators
//!
//! # Overview
//!
//! Each pass implements the [`JobPass`](crate::traits::JobPass) trait and can be
//! applied on its own with [`run_pass`] or combined in a
//! [`PassChain`](crate::traits::PassChain).
//!
//! # Example
//!
//! ```ignore
//! use qat_rewriter::transformers::{run_pass, QuantAwareTraining};
//!
//! let (job, result) = run_pass(job, &QuantAwareTraining::new())?;
//!
//! println!("Inserted {} markers", result.markers_inserted());
//! for name in &result.markers {
//!     println!("  {}", name);
//! }
//! ```

/// Common utilities and types
pub mod common;
/// Fake-quant marker insertion
pub mod quant_aware_training;

// Re-export common types
pub use common::{run_pass, PassResult};

// Re-export passes
pub use quant_aware_training::{QatConfig, QuantAwareTraining};
