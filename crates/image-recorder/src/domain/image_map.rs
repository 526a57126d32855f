use crate::domain::classifier::ImageClassifier;
use crate::domain::snapshot::WorkloadSnapshot;

/// Container name to image reference, restricted to monitored containers.
///
/// Entries keep the order of the snapshot they were extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMap {
    entries: Vec<(String, String)>,
}

impl ImageMap {
    pub fn extract(snapshot: &WorkloadSnapshot, classifier: &ImageClassifier) -> Self {
        let entries = snapshot
            .containers
            .iter()
            .filter(|c| classifier.matches(&c.image))
            .map(|c| (c.name.clone(), c.image.clone()))
            .collect();

        Self { entries }
    }

    pub fn get(&self, container_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == container_name)
            .map(|(_, image)| image.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, image)| (name.as_str(), image.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
