//! Application module
//!
//! Wiring and lifecycle: the builder connects to the cluster, the tasks module
//! runs one watcher per workload kind until a shutdown signal arrives.

pub mod builder;
pub mod core;
pub mod pipeline;
pub mod tasks;

pub use builder::ApplicationBuilder;
pub use core::Application;
pub use pipeline::ChangePipeline;
