//! HTTP handlers

pub mod health;
pub mod model_info;
pub mod predict;
