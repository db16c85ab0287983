//! Shared data model for Wayfarer content packages.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_package};
