//! Configuration validation
//!
//! - `config_validators`: batch, provider and polling validators

mod config_validators;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
