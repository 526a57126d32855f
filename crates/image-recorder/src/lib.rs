pub mod app;
pub mod config;
pub mod domain;
mod infrastructure;

// Re-export main modules
pub use infrastructure::emitter;
pub use infrastructure::k8s;
