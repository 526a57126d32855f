//! Kubernetes integration module.
//!
//! The main components are:
//! - [`WorkloadWatcher`]: watches one workload kind and delivers (old, new) snapshot pairs
//! - [`kube_client::init_kube_client`]: builds a client from a kubeconfig or the environment

use core::error::Error;

pub mod kube_client;
pub mod workload_watcher;

pub use workload_watcher::WorkloadWatcher;

/// Errors that can occur during Kubernetes operations.
#[derive(Debug, derive_more::Display)]
pub enum KubernetesError {
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Failed to watch workloads: {message}")]
    WatchFailed { message: String },
}

impl Error for KubernetesError {}
