//! provides logging helpers

use std::env;
use std::ffi::OsString;
use std::io::IsTerminal;

use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// initiate the global tracing subscriber
///
/// Diagnostics go to stderr only, leaving stdout to program output. Colors
/// are used when stderr is a terminal and `NO_COLOR` is unset or empty.
pub fn init() {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let ansi = use_ansi(env::var_os("NO_COLOR"), std::io::stderr().is_terminal());

    let fmt_layer = layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .with_filter(env_filter);

    registry().with(fmt_layer).init();
}

fn use_ansi(no_color: Option<OsString>, stderr_is_terminal: bool) -> bool {
    let no_color = no_color.is_some_and(|value| !value.is_empty());
    stderr_is_terminal && !no_color
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn colors_only_on_terminal() {
        assert_eq!(use_ansi(None, true), true);
        assert_eq!(use_ansi(None, false), false);
    }

    #[test]
    fn no_color_disables_colors() {
        assert_eq!(use_ansi(Some(OsString::from("1")), true), false);
        assert_eq!(use_ansi(Some(OsString::new()), true), true);
    }
}
