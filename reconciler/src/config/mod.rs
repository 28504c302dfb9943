//! Configuration

pub mod params;

pub use params::ModuleParams;
