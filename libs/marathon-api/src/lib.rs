//! Marathon v2 API models

pub mod models;

pub use models::*;
