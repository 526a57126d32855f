use error_stack::Report;
use regex::Regex;

use crate::domain::error::ConfigError;

/// Decides whether a container image reference is monitored.
///
/// The pattern is compiled once; a malformed or empty pattern is rejected
/// here so that [`ImageClassifier::matches`] cannot fail afterwards.
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    pattern: Regex,
}

impl ImageClassifier {
    /// # Errors
    ///
    /// - [`ConfigError::EmptyPattern`] if `pattern` is empty
    /// - [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex
    pub fn new(pattern: &str) -> Result<Self, Report<ConfigError>> {
        if pattern.is_empty() {
            return Err(Report::new(ConfigError::EmptyPattern));
        }

        let pattern = Regex::new(pattern).map_err(|e| {
            Report::new(ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        })?;

        Ok(Self { pattern })
    }

    /// Unanchored search over the whole reference, registry host and tag included.
    pub fn matches(&self, reference: &str) -> bool {
        self.pattern.is_match(reference)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_anywhere_in_reference() {
        let classifier = ImageClassifier::new(r".*example\.com.*").expect("valid pattern");

        assert!(classifier.matches("registry.example.com/app:1.2.0"));
        assert!(!classifier.matches("docker.io/library/nginx:1.25"));
    }

    #[test]
    fn unanchored_pattern_matches_tag_portion() {
        let classifier = ImageClassifier::new("-rc").expect("valid pattern");

        assert!(classifier.matches("docker.io/app:2.0-rc1"));
        assert!(!classifier.matches("docker.io/app:2.0"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let err = ImageClassifier::new("").expect_err("empty pattern must fail");
        assert!(matches!(err.current_context(), ConfigError::EmptyPattern));
    }

    #[test]
    fn malformed_pattern_is_rejected_up_front() {
        let err = ImageClassifier::new("registry.(example").expect_err("unbalanced group");
        assert!(matches!(
            err.current_context(),
            ConfigError::InvalidPattern { pattern, .. } if pattern == "registry.(example"
        ));
    }
}
