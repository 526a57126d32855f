use std::sync::LazyLock;

/// Defines the application version.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format_version(
        env!("IMAGE_VERSION"),
        option_env!("VERGEN_GIT_SHA"),
        option_env!("VERGEN_GIT_DIRTY") == Some("true"),
    )
});

fn format_version(version: &str, sha: Option<&str>, dirty: bool) -> String {
    format!(
        "{}-{}{}",
        version,
        sha.unwrap_or("unknown"),
        if dirty { "-dirty" } else { "" }
    )
}
