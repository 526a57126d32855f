//! Change record emitter.
//!
//! Writes each record as one JSON line to stdout and/or an append-only file.
//! Every call is a complete, independent write: the file is opened, appended,
//! flushed and closed within [`RecordEmitter::emit`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::config::SinkConfig;
use crate::domain::ChangeRecord;
use crate::domain::EmitError;
use crate::domain::RecordSink;

#[derive(Debug, Clone)]
pub struct RecordEmitter {
    stdout: bool,
    record_file: Option<PathBuf>,
}

impl RecordEmitter {
    pub fn new(sinks: &SinkConfig) -> Self {
        Self {
            stdout: sinks.stdout,
            record_file: sinks.record_file.clone(),
        }
    }

    /// Serialize a record to its newline-terminated line form.
    pub fn encode(record: &ChangeRecord) -> Result<String, EmitError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        Ok(line)
    }

    fn write_stdout(line: &str) -> Result<(), EmitError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(line.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(EmitError::Stdout)
    }
}

/// Append one line to `path`, creating the file if needed.
pub fn append_line(path: &Path, line: &str) -> Result<(), EmitError> {
    let to_error = |source| EmitError::File {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;

    file.write_all(line.as_bytes()).map_err(to_error)?;
    file.flush().map_err(to_error)
}

impl RecordSink for RecordEmitter {
    /// Both sinks are attempted even if the first one fails; the first
    /// failure is returned.
    fn emit(&self, record: &ChangeRecord) -> Result<(), EmitError> {
        let line = Self::encode(record)?;

        let stdout_result = if self.stdout {
            Self::write_stdout(&line)
        } else {
            Ok(())
        };

        let file_result = match &self.record_file {
            Some(path) => append_line(path, &line),
            None => Ok(()),
        };

        stdout_result.and(file_result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn record(new_tag: &str) -> ChangeRecord {
        ChangeRecord::tag_change(
            "registry.example.com/app",
            "1.2.0",
            new_tag,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        )
    }

    fn file_emitter(path: PathBuf) -> RecordEmitter {
        RecordEmitter::new(&SinkConfig {
            stdout: false,
            record_file: Some(path),
        })
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("records.log");
        let emitter = file_emitter(path.clone());

        emitter.emit(&record("1.3.0")).expect("first emit");
        emitter.emit(&record("1.4.0")).expect("second emit");

        let content = std::fs::read_to_string(&path).expect("should read records");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(content.ends_with('\n'));

        let parsed: ChangeRecord = serde_json::from_str(lines[1]).expect("valid json line");
        assert_eq!(parsed, record("1.4.0"));
    }

    #[test]
    fn existing_content_is_preserved() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("records.log");
        std::fs::write(&path, "previous\n").expect("should seed file");

        file_emitter(path.clone())
            .emit(&record("1.3.0"))
            .expect("should emit");

        let content = std::fs::read_to_string(&path).expect("should read records");
        assert!(content.starts_with("previous\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn unwritable_file_reports_path() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("missing-dir").join("records.log");

        let err = file_emitter(path.clone())
            .emit(&record("1.3.0"))
            .expect_err("parent directory does not exist");

        match err {
            EmitError::File { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encoded_line_is_newline_terminated() {
        let line = RecordEmitter::encode(&record("1.3.0")).expect("should encode");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with("}\n"));
    }
}
