//! PhishGuard core
//!
//! Feature contracts shared by the prediction service and the offline
//! training pipeline, plus the classifier they both depend on.

pub mod constants;
pub mod features;
pub mod model;
pub mod training;
