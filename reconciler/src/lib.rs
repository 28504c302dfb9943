//! Marathon app reconciler
//!
//! Compares a declared Marathon app with the live one, creates, updates or
//! deletes it as needed and waits for the deployment to roll out.

pub mod app;
pub mod config;
pub mod errors;
pub mod logs;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod utils;
