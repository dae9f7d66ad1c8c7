//! Core functionality
//!
//! Batch orchestration and the provider adapters it drives.

pub mod batch;
pub mod providers;
