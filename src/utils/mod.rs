//! Utility modules for the batch runner
//!
//! - **error**: runner error type and result alias
//! - **jsonl**: request and result files
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod jsonl;
pub mod logging;

pub use error::{Result, RunnerError};
pub use logging::{LoggingOptions, init_tracing};
