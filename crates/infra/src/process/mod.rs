//! External process invocation.
//!
//! - `types`: invocation request, captured output, failure taxonomy
//! - `invoker`: the [`ProcessInvoker`] seam and its tokio implementation
//!
//! An invocation either succeeds with captured text or fails with exactly one
//! [`ProcessError`]; no state survives between calls.

pub mod invoker;
pub mod types;

pub use invoker::{ProcessInvoker, TokioProcessInvoker};
pub use types::{ProcessError, ProcessInvocation, ProcessOutput};
