//! Edit module: Pure text-diff primitives used by the buffer managers.
//!
//! This module contains:
//! - [`compute_minimal_edit`]: the common-prefix/common-suffix trimmed
//!   replacement between two strings
//! - [`AppendBuffer`]: fragments awaiting a single batched bookkeeping flush

mod append;
mod minimal;

pub use append::AppendBuffer;
pub use minimal::{compute_minimal_edit, MinimalEdit};
