//! Change pipeline: namespace filter → tag diff → emitter.

use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;

use crate::config::RecorderConfig;
use crate::domain::ChangeRecord;
use crate::domain::Clock;
use crate::domain::RecordSink;
use crate::domain::TagDiffEngine;
use crate::domain::UpdateHandler;
use crate::domain::WorkloadSnapshot;

/// Handler registered with every workload watcher.
pub struct ChangePipeline {
    config: Arc<RecorderConfig>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
}

impl ChangePipeline {
    pub fn new(config: Arc<RecorderConfig>, sink: Arc<dyn RecordSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            sink,
            clock,
        }
    }

    /// Records that qualify for emission for one (old, new) pair.
    pub fn detect(&self, old: &WorkloadSnapshot, new: &WorkloadSnapshot) -> Vec<ChangeRecord> {
        if self.config.excluded_namespaces.is_excluded(&new.namespace) {
            debug!(namespace = %new.namespace, name = %new.name, "Skipping excluded namespace");
            return Vec::new();
        }

        TagDiffEngine::new(
            &self.config.classifier,
            self.config.diff_options,
            self.clock.as_ref(),
        )
        .diff(old, new)
    }
}

impl UpdateHandler for ChangePipeline {
    fn handle(&self, old: &WorkloadSnapshot, new: &WorkloadSnapshot) {
        for record in self.detect(old, new) {
            info!(
                kind = %new.kind,
                namespace = %new.namespace,
                name = %new.name,
                image = %record.image_name,
                old_tag = %record.old_tag,
                new_tag = %record.new_tag,
                swap = record.is_image_swap(),
                "Image tag changed"
            );

            // one attempt per record; a failed write is not retried
            if let Err(e) = self.sink.emit(&record) {
                error!(
                    namespace = %new.namespace,
                    name = %new.name,
                    "Failed to emit change record: {e}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use chrono::TimeZone;
    use chrono::Utc;
    use clap::Parser;
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::config::Cli;
    use crate::domain::ContainerSpec;
    use crate::domain::EmitError;
    use crate::domain::WorkloadKind;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<ChangeRecord>>,
        fail: bool,
    }

    impl RecordSink for MemorySink {
        fn emit(&self, record: &ChangeRecord) -> Result<(), EmitError> {
            self.records.lock().expect("lock").push(record.clone());
            if self.fail {
                return Err(EmitError::Stdout(std::io::Error::other("closed")));
            }
            Ok(())
        }
    }

    fn config(args: &[&str]) -> Arc<RecorderConfig> {
        let mut argv = vec!["image-recorder", "--no-record-file", "--no-stdout"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).expect("should parse");
        Arc::new(RecorderConfig::from_cli(&cli).expect("valid config"))
    }

    fn snapshot(namespace: &str, resource_version: &str, image: &str) -> WorkloadSnapshot {
        WorkloadSnapshot {
            kind: WorkloadKind::Deployment,
            name: "web".to_string(),
            namespace: namespace.to_string(),
            resource_version: resource_version.to_string(),
            containers: vec![ContainerSpec::new("app", image)],
        }
    }

    fn pipeline(sink: Arc<MemorySink>, args: &[&str]) -> ChangePipeline {
        ChangePipeline::new(config(args), sink, Arc::new(FixedClock))
    }

    #[test]
    fn tag_change_reaches_sink() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = pipeline(sink.clone(), &["--image-host", r".*example\.com.*"]);

        pipeline.handle(
            &snapshot("shop", "1", "registry.example.com/app:1.2.0"),
            &snapshot("shop", "2", "registry.example.com/app:1.3.0"),
        );

        let records = sink.records.lock().expect("lock").clone();
        assert_eq!(
            records,
            vec![ChangeRecord::tag_change(
                "registry.example.com/app",
                "1.2.0",
                "1.3.0",
                FixedClock.now()
            )]
        );
    }

    #[test]
    fn excluded_namespace_never_emits() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = pipeline(sink.clone(), &["--image-host", ".*"]);

        pipeline.handle(
            &snapshot("kube-system", "1", "registry.example.com/coredns:1.10"),
            &snapshot("kube-system", "2", "registry.example.com/coredns:1.11"),
        );

        assert!(sink.records.lock().expect("lock").is_empty());
    }

    #[test]
    fn custom_exclusions_replace_defaults() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = pipeline(sink.clone(), &["--image-host", ".*", "--no-ns", "staging"]);

        let old = snapshot("kube-system", "1", "registry.example.com/coredns:1.10");
        let new = snapshot("kube-system", "2", "registry.example.com/coredns:1.11");
        assert_eq!(pipeline.detect(&old, &new).len(), 1);

        let old = snapshot("staging", "1", "registry.example.com/app:1");
        let new = snapshot("staging", "2", "registry.example.com/app:2");
        assert!(pipeline.detect(&old, &new).is_empty());
    }

    #[test]
    fn sink_failure_does_not_stop_later_events() {
        let sink = Arc::new(MemorySink {
            fail: true,
            ..Default::default()
        });
        let pipeline = pipeline(sink.clone(), &["--image-host", "example"]);

        pipeline.handle(
            &snapshot("shop", "1", "registry.example.com/app:1"),
            &snapshot("shop", "2", "registry.example.com/app:2"),
        );
        pipeline.handle(
            &snapshot("shop", "2", "registry.example.com/app:2"),
            &snapshot("shop", "3", "registry.example.com/app:3"),
        );

        assert_eq!(sink.records.lock().expect("lock").len(), 2);
    }
}
