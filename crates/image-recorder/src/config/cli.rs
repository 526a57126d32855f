use std::path::PathBuf;

use clap::Parser;
use utils::version;

use crate::domain::ExcludedNamespaces;
use crate::domain::ReportMode;
use crate::domain::WorkloadKind;

/// Record every container image tag change of the cluster's workloads.
#[derive(Parser, Debug, Clone)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[arg(
        long,
        env = "IMAGE_HOST",
        help = "Image reference regexp to watch, like '.*tencent.cloudtcr.com.*'"
    )]
    pub image_host: String,

    #[arg(
        long = "no-ns",
        env = "NOT_WATCHED_NS",
        default_value = ExcludedNamespaces::SYSTEM_DEFAULT,
        help = "Pipe-delimited namespace names not watched"
    )]
    pub not_watched_ns: String,

    #[arg(
        long,
        env = "RECORD_LOG_PATH",
        value_hint = clap::ValueHint::FilePath,
        help = "File change records are appended to (defaults to ~/.deploy_image_record.log)"
    )]
    pub record_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Do not append change records to a file",
        conflicts_with = "record_file"
    )]
    pub no_record_file: bool,

    #[arg(long, help = "Do not print change records to stdout")]
    pub no_stdout: bool,

    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "deployment",
        help = "Workload kinds to watch"
    )]
    pub kinds: Vec<WorkloadKind>,

    #[arg(
        long,
        value_enum,
        default_value_t = ReportMode::First,
        help = "Report only the first changed container per update, or all of them"
    )]
    pub report_mode: ReportMode,

    #[arg(
        long,
        help = "Also report containers whose image name changed, not only the tag"
    )]
    pub report_image_swaps: bool,

    #[arg(long, help = "Also monitor init containers")]
    pub include_init_containers: bool,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,
}
