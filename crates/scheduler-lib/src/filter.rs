//! Idempotency guards
//!
//! Decide from a resource's live status whether a transition should be
//! requested. Starting an already running instance would reboot it, and
//! stopping a database mid-upgrade is refused or harmful, so both are skipped.

use crate::provider::{DbInstance, InstanceStatus};
use std::fmt;

/// Outcome of checking one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Apply,
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_apply(&self) -> bool {
        matches!(self, Verdict::Apply)
    }
}

/// Why a candidate was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyStarted,
    AlreadyStopped,
    /// Database start requested while not fully stopped
    NotStopped(String),
    /// Multi-AZ SQL Server cannot be stopped by the provider
    MultiAzSqlServer(String),
    /// Database stop requested while not available (upgrading, starting, ...)
    NotAvailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyStarted => write!(f, "already started"),
            SkipReason::AlreadyStopped => write!(f, "already stopped"),
            SkipReason::NotStopped(status) => write!(f, "status is {}, not stopped", status),
            SkipReason::MultiAzSqlServer(engine) => {
                write!(f, "multi-AZ {} cannot be stopped", engine)
            }
            SkipReason::NotAvailable(status) => write!(f, "status is {}, not available", status),
        }
    }
}

const TERMINATED: &str = "terminated";
const DB_STOPPED: &str = "stopped";
const DB_AVAILABLE: &str = "available";
const SQLSERVER_ENGINE_PREFIX: &str = "sqlserver";

/// Status queries only report instances that are up; a terminated record
/// does not count as running
fn has_live_record(statuses: &[InstanceStatus]) -> bool {
    statuses
        .iter()
        .any(|status| status.state.as_deref() != Some(TERMINATED))
}

pub fn instance_start_verdict(statuses: &[InstanceStatus]) -> Verdict {
    if has_live_record(statuses) {
        Verdict::Skip(SkipReason::AlreadyStarted)
    } else {
        Verdict::Apply
    }
}

pub fn instance_stop_verdict(statuses: &[InstanceStatus]) -> Verdict {
    if has_live_record(statuses) {
        Verdict::Apply
    } else {
        Verdict::Skip(SkipReason::AlreadyStopped)
    }
}

pub fn db_start_verdict(db: &DbInstance) -> Verdict {
    if db.status == DB_STOPPED {
        Verdict::Apply
    } else {
        Verdict::Skip(SkipReason::NotStopped(db.status.clone()))
    }
}

pub fn db_stop_verdict(db: &DbInstance) -> Verdict {
    if db.multi_az && db.engine.starts_with(SQLSERVER_ENGINE_PREFIX) {
        Verdict::Skip(SkipReason::MultiAzSqlServer(db.engine.clone()))
    } else if db.status != DB_AVAILABLE {
        Verdict::Skip(SkipReason::NotAvailable(db.status.clone()))
    } else {
        Verdict::Apply
    }
}
