pub mod cli;

use std::env;
use std::path::PathBuf;

use error_stack::Report;

pub use cli::*;

use crate::domain::ConfigError;
use crate::domain::DiffOptions;
use crate::domain::ExcludedNamespaces;
use crate::domain::ImageClassifier;
use crate::domain::WorkloadKind;

/// File name of the default record file, placed in the user's home directory.
pub const DEFAULT_RECORD_FILE_NAME: &str = ".deploy_image_record.log";

/// Where emitted change records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub stdout: bool,
    pub record_file: Option<PathBuf>,
}

/// Validated process configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub classifier: ImageClassifier,
    pub excluded_namespaces: ExcludedNamespaces,
    pub diff_options: DiffOptions,
    pub include_init_containers: bool,
    pub kinds: Vec<WorkloadKind>,
    pub sinks: SinkConfig,
    pub kubeconfig: Option<PathBuf>,
}

impl RecorderConfig {
    /// # Errors
    ///
    /// - [`ConfigError::EmptyPattern`] / [`ConfigError::InvalidPattern`] for a bad `--image-host`
    /// - [`ConfigError::RecordFile`] if no record file is given and `HOME` is unset
    pub fn from_cli(cli: &Cli) -> Result<Self, Report<ConfigError>> {
        let classifier = ImageClassifier::new(&cli.image_host)?;

        let record_file = resolve_record_file(
            cli.record_file.clone(),
            cli.no_record_file,
            env::var_os("HOME").map(PathBuf::from),
        )?;

        let mut kinds: Vec<WorkloadKind> = Vec::with_capacity(cli.kinds.len());
        for kind in &cli.kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        Ok(Self {
            classifier,
            excluded_namespaces: ExcludedNamespaces::parse(&cli.not_watched_ns),
            diff_options: DiffOptions {
                report_mode: cli.report_mode,
                report_image_swaps: cli.report_image_swaps,
            },
            include_init_containers: cli.include_init_containers,
            kinds,
            sinks: SinkConfig {
                stdout: !cli.no_stdout,
                record_file,
            },
            kubeconfig: cli.kubeconfig.clone(),
        })
    }
}

fn resolve_record_file(
    record_file: Option<PathBuf>,
    disabled: bool,
    home: Option<PathBuf>,
) -> Result<Option<PathBuf>, Report<ConfigError>> {
    if disabled {
        return Ok(None);
    }
    if let Some(path) = record_file {
        return Ok(Some(path));
    }

    match home {
        Some(home) => Ok(Some(home.join(DEFAULT_RECORD_FILE_NAME))),
        None => Err(Report::new(ConfigError::RecordFile {
            message: "HOME is not set; pass --record-file or --no-record-file".to_string(),
        })),
    }
}
