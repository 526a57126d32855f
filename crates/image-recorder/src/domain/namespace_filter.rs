use std::collections::HashSet;

/// Namespaces whose workloads are never inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedNamespaces {
    names: HashSet<String>,
}

impl ExcludedNamespaces {
    /// Namespaces reserved by the cluster itself.
    pub const SYSTEM_DEFAULT: &'static str = "kube-system|kube-public|kube-node-lease";

    /// Parse a pipe-delimited list of namespace names.
    pub fn parse(value: &str) -> Self {
        Self {
            names: value.split('|').map(str::to_string).collect(),
        }
    }

    /// Exact name comparison; an empty namespace never counts as excluded.
    pub fn is_excluded(&self, namespace: &str) -> bool {
        !namespace.is_empty() && self.names.contains(namespace)
    }

    /// Server-side form of the filter, e.g. `metadata.namespace!=a,metadata.namespace!=b`.
    pub fn field_selector(&self) -> Option<String> {
        let mut names: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return None;
        }

        names.sort_unstable();
        Some(
            names
                .iter()
                .map(|name| format!("metadata.namespace!={name}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn system_default_excludes_kube_namespaces() {
        let excluded = ExcludedNamespaces::parse(ExcludedNamespaces::SYSTEM_DEFAULT);

        assert!(excluded.is_excluded("kube-system"));
        assert!(excluded.is_excluded("kube-public"));
        assert!(excluded.is_excluded("kube-node-lease"));
        assert!(!excluded.is_excluded("default"));
    }

    #[test]
    fn membership_is_exact() {
        let excluded = ExcludedNamespaces::parse("kube-system");

        assert!(!excluded.is_excluded("kube"));
        assert!(!excluded.is_excluded("kube-system-extra"));
        assert!(!excluded.is_excluded("KUBE-SYSTEM"));
    }

    #[test]
    fn empty_entries_match_nothing() {
        let excluded = ExcludedNamespaces::parse("|staging||");

        assert!(excluded.is_excluded("staging"));
        assert!(!excluded.is_excluded(""));
        assert_eq!(
            excluded.field_selector().as_deref(),
            Some("metadata.namespace!=staging")
        );
    }

    #[test]
    fn field_selector_joins_all_names() {
        let excluded = ExcludedNamespaces::parse("kube-system|kube-public");

        assert_eq!(
            excluded.field_selector().as_deref(),
            Some("metadata.namespace!=kube-public,metadata.namespace!=kube-system")
        );
    }

    #[test]
    fn empty_list_has_no_selector() {
        assert_eq!(ExcludedNamespaces::parse("").field_selector(), None);
    }
}
