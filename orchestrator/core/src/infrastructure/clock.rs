// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Injectable clock for execution-log timestamps.
//!
//! The orchestrator never reads wall time directly; it asks the clock it was
//! constructed with, so log timestamps are deterministic under test and do not
//! require a live async runtime.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// Strictly monotonic as long as `step` is positive.
#[derive(Debug)]
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl StepClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Starts at the Unix epoch and ticks one second per read.
    pub fn epoch_seconds() -> Self {
        Self::new(DateTime::UNIX_EPOCH, Duration::seconds(1))
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock();
        let current = *next;
        *next += self.step;
        current
    }
}
