//! Seams between the change pipeline and its collaborators

use chrono::DateTime;
use chrono::Utc;

use crate::domain::error::EmitError;
use crate::domain::record::ChangeRecord;
use crate::domain::snapshot::WorkloadSnapshot;

/// Receives every (old, new) snapshot pair delivered by a subscription.
///
/// Invoked serially per watched kind; implementations must not assume
/// concurrent calls for the same kind.
pub trait UpdateHandler: Send + Sync {
    fn handle(&self, old: &WorkloadSnapshot, new: &WorkloadSnapshot);
}

/// Destination for emitted change records
pub trait RecordSink: Send + Sync {
    /// Write one record as a single complete unit; no buffering across calls.
    fn emit(&self, record: &ChangeRecord) -> Result<(), EmitError>;
}

/// Trait for getting current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
