//! Point-in-time views of workload resources.

use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::Resource;
use kube::ResourceExt;

/// Workload controller kinds that can be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, derive_more::Display)]
pub enum WorkloadKind {
    #[display("Deployment")]
    Deployment,
    #[display("StatefulSet")]
    #[value(name = "statefulset")]
    StatefulSet,
    #[display("DaemonSet")]
    #[value(name = "daemonset")]
    DaemonSet,
}

/// A container as declared in a workload's pod template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }
}

impl From<&Container> for ContainerSpec {
    fn from(container: &Container) -> Self {
        Self {
            name: container.name.clone(),
            image: container.image.clone().unwrap_or_default(),
        }
    }
}

/// Immutable view of one workload resource at one resource version.
///
/// Containers keep the order of the pod template, which makes the
/// first-match behavior of the diff engine reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSnapshot {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub resource_version: String,
    pub containers: Vec<ContainerSpec>,
}

impl WorkloadSnapshot {
    /// Stable identity of the underlying object, used as the watcher cache key.
    pub fn key(&self) -> (String, String) {
        (self.namespace.clone(), self.name.clone())
    }
}

/// Conversion from a watched Kubernetes object into a [`WorkloadSnapshot`].
pub trait IntoSnapshot: Resource + Sized {
    const KIND: WorkloadKind;

    /// The pod template carried by the controller spec, if any.
    fn pod_template(&self) -> Option<&PodTemplateSpec>;

    fn to_snapshot(&self, include_init_containers: bool) -> WorkloadSnapshot {
        let pod_spec = self.pod_template().and_then(|t| t.spec.as_ref());

        let mut containers: Vec<ContainerSpec> = pod_spec
            .map(|spec| spec.containers.iter().map(ContainerSpec::from).collect())
            .unwrap_or_default();

        if include_init_containers {
            if let Some(init) = pod_spec.and_then(|spec| spec.init_containers.as_ref()) {
                containers.extend(init.iter().map(ContainerSpec::from));
            }
        }

        WorkloadSnapshot {
            kind: Self::KIND,
            name: self.name_any(),
            namespace: self.namespace().unwrap_or_default(),
            resource_version: self.resource_version().unwrap_or_default(),
            containers,
        }
    }
}

impl IntoSnapshot for Deployment {
    const KIND: WorkloadKind = WorkloadKind::Deployment;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}

impl IntoSnapshot for StatefulSet {
    const KIND: WorkloadKind = WorkloadKind::StatefulSet;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}

impl IntoSnapshot for DaemonSet {
    const KIND: WorkloadKind = WorkloadKind::DaemonSet;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|spec| &spec.template)
    }
}
