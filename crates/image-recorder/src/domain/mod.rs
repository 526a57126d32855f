//! Change-detection core: everything here is pure and cluster-agnostic
//! except for the snapshot conversions from k8s-openapi types.

pub mod classifier;
pub mod error;
pub mod image_map;
pub mod namespace_filter;
pub mod record;
pub mod snapshot;
pub mod tag_diff;
pub mod traits;

pub use classifier::ImageClassifier;
pub use error::ConfigError;
pub use error::EmitError;
pub use image_map::ImageMap;
pub use namespace_filter::ExcludedNamespaces;
pub use record::ChangeRecord;
pub use snapshot::ContainerSpec;
pub use snapshot::IntoSnapshot;
pub use snapshot::WorkloadKind;
pub use snapshot::WorkloadSnapshot;
pub use tag_diff::DiffOptions;
pub use tag_diff::ReportMode;
pub use tag_diff::TagDiffEngine;
pub use traits::Clock;
pub use traits::RecordSink;
pub use traits::SystemClock;
pub use traits::UpdateHandler;
