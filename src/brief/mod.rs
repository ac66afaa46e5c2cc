//! Creative brief module.
//!
//! - `model`: the validated `CreativeBrief` and its enumerated choices
//! - `form`: raw form input and submission-time validation

pub mod form;
pub mod model;

pub use form::BriefForm;
pub use model::*;
