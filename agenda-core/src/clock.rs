//! Source of the current time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::time::to_local;

pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Today's calendar date in local time.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        FixedClock(now)
    }

    /// Freeze the clock at a local wall-clock date-time.
    pub fn at(naive: NaiveDateTime) -> Self {
        FixedClock(to_local(naive))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
