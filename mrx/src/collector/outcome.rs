use anyhow::Result;
use log::error;
use strum::IntoStaticStr;

/// Result of one collection stage. An aborted stage keeps
/// whatever it emitted before the failing call.
#[derive(Debug)]
pub enum StageOutcome<T> {
    Complete(T),
    /// Nothing to do this cycle, e.g. metadata with the router down
    Skipped,
    Aborted(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum StageStatus {
    Complete,
    Skipped,
    Aborted,
}

impl<T> StageOutcome<T> {
    pub fn status(&self) -> StageStatus {
        match self {
            StageOutcome::Complete(_) => StageStatus::Complete,
            StageOutcome::Skipped => StageStatus::Skipped,
            StageOutcome::Aborted(_) => StageStatus::Aborted,
        }
    }

    pub fn complete(&self) -> Option<&T> {
        match self {
            StageOutcome::Complete(value) => Some(value),
            _ => None,
        }
    }

    /// Logs an aborted stage to the error channel
    pub fn report(&self, stage: &str) {
        if let StageOutcome::Aborted(e) = self {
            error!("{} stage aborted: {:#}", stage, e);
        }
    }
}

impl<T> From<Result<T>> for StageOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => StageOutcome::Complete(value),
            Err(e) => StageOutcome::Aborted(e),
        }
    }
}
