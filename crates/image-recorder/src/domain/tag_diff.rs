//! Tag diff engine.
//!
//! Compares the monitored images of two snapshots of the same workload and
//! produces a [`ChangeRecord`] for every container whose image kept its base
//! name but moved to a different tag.

use tracing::trace;

use crate::domain::classifier::ImageClassifier;
use crate::domain::image_map::ImageMap;
use crate::domain::record::ChangeRecord;
use crate::domain::snapshot::WorkloadSnapshot;
use crate::domain::traits::Clock;

/// How many changes are reported for a single event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, derive_more::Display)]
pub enum ReportMode {
    /// Only the first changed container, in old-snapshot container order.
    #[default]
    #[display("first")]
    First,
    /// Every changed container, in old-snapshot container order.
    #[display("all")]
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub report_mode: ReportMode,
    /// Also report containers whose image base name changed.
    pub report_image_swaps: bool,
}

/// An image reference split into base name and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageReference<'a> {
    pub base: &'a str,
    pub tag: &'a str,
}

impl<'a> ImageReference<'a> {
    /// Split `base:tag`.
    ///
    /// Returns `None` unless the reference splits on `:` into exactly two
    /// non-empty parts and the tag holds no `/`. Digest references, registry
    /// ports and untagged images all fall out here.
    pub fn parse(reference: &'a str) -> Option<Self> {
        if reference.contains('@') {
            return None;
        }

        let (base, tag) = reference.split_once(':')?;
        if base.is_empty() || tag.is_empty() || tag.contains(':') || tag.contains('/') {
            return None;
        }

        Some(Self { base, tag })
    }
}

pub struct TagDiffEngine<'a> {
    classifier: &'a ImageClassifier,
    options: DiffOptions,
    clock: &'a dyn Clock,
}

impl<'a> TagDiffEngine<'a> {
    pub fn new(classifier: &'a ImageClassifier, options: DiffOptions, clock: &'a dyn Clock) -> Self {
        Self {
            classifier,
            options,
            clock,
        }
    }

    /// Diff two snapshots of one workload.
    ///
    /// Pairs with an identical resource version are redeliveries and never
    /// produce records. In [`ReportMode::First`] at most one record is returned.
    pub fn diff(&self, old: &WorkloadSnapshot, new: &WorkloadSnapshot) -> Vec<ChangeRecord> {
        if old.resource_version == new.resource_version {
            return Vec::new();
        }

        let old_images = ImageMap::extract(old, self.classifier);
        let new_images = ImageMap::extract(new, self.classifier);
        if old_images.is_empty() || new_images.is_empty() {
            return Vec::new();
        }
        trace!(
            name = %new.name,
            old_monitored = old_images.len(),
            new_monitored = new_images.len(),
            "diffing monitored images"
        );
        let detected_at = self.clock.now();

        let mut records = Vec::new();
        for (container, old_ref) in old_images.iter() {
            let Some(new_ref) = new_images.get(container) else {
                continue;
            };

            let (Some(old_image), Some(new_image)) =
                (ImageReference::parse(old_ref), ImageReference::parse(new_ref))
            else {
                trace!(container, old_ref, new_ref, "skipping reference not diffable by tag");
                continue;
            };

            if old_image.tag == new_image.tag && old_image.base == new_image.base {
                continue;
            }

            let record = if old_image.base == new_image.base {
                ChangeRecord::tag_change(old_image.base, old_image.tag, new_image.tag, detected_at)
            } else if self.options.report_image_swaps {
                ChangeRecord::image_swap(
                    old_image.base,
                    new_image.base,
                    old_image.tag,
                    new_image.tag,
                    detected_at,
                )
            } else {
                continue;
            };

            records.push(record);
            if self.options.report_mode == ReportMode::First {
                break;
            }
        }

        records
    }
}
