//! Housekeeping for the appointment store.
//!
//! Every pass rewrites the store only when it actually changed something.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::appointment::Appointment;
use crate::clock::Clock;
use crate::error::AgendaResult;
use crate::repo::{AppointmentRepository, ServiceRepository};
use crate::storage::Storage;
use crate::time::normalize_time;

/// How many appointments each pass of [`Sanitizer::sweep`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub invalid: usize,
    pub completed_unidentified: usize,
    pub orphaned: usize,
    pub expired: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.invalid + self.completed_unidentified + self.orphaned + self.expired
    }
}

pub struct Sanitizer<'a> {
    storage: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> Sanitizer<'a> {
    pub fn new(storage: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        Sanitizer { storage, clock }
    }

    /// Drop appointments without an id, or whose contact name or phone is
    /// blank or just dashes.
    pub fn remove_invalid(&self) -> AgendaResult<usize> {
        self.retain("invalid", |a| {
            a.has_valid_id() && !is_placeholder(&a.contact.name) && !is_placeholder(&a.contact.phone)
        })
    }

    /// Drop completed appointments that also have no usable id.
    pub fn remove_completed_unidentified(&self) -> AgendaResult<usize> {
        self.retain("completed_unidentified", |a| {
            !(a.is_completed() && !a.has_valid_id())
        })
    }

    /// Drop appointments dated before `today`.
    pub fn remove_expired(&self, today: NaiveDate) -> AgendaResult<usize> {
        self.retain("expired", |a| a.date >= today)
    }

    /// Trim ids, normalize times, and drop appointments whose service no
    /// longer exists. Service ids are read from the raw catalog, so a record
    /// that fails to decode still counts as existing. Returns the number of
    /// orphans removed.
    pub fn sanear(&self) -> AgendaResult<usize> {
        let repo = AppointmentRepository::new(self.storage);
        let appointments = repo.all()?;
        let catalog = ServiceRepository::new(self.storage).stored_ids()?;
        if catalog.is_none() {
            warn!("service catalog is unreadable, skipping orphan removal");
        }

        let before = appointments.len();
        let mut rewritten = false;

        let kept: Vec<Appointment> = appointments
            .into_iter()
            .filter_map(|mut a| {
                let id = a.id.trim();
                if id != a.id {
                    a.id = id.to_string();
                    rewritten = true;
                }
                let time = normalize_time(&a.time);
                if time != a.time {
                    a.time = time;
                    rewritten = true;
                }
                catalog
                    .as_ref()
                    .is_none_or(|ids| ids.contains(a.service_id.trim()))
                    .then_some(a)
            })
            .collect();

        let orphaned = before - kept.len();
        if orphaned > 0 || rewritten {
            repo.save_all(&kept)?;
            info!(orphaned, rewritten, "appointment store sanitized");
        }
        Ok(orphaned)
    }

    /// Run every pass: invalid records, completed records without id,
    /// orphans, then appointments from past days.
    pub fn sweep(&self) -> AgendaResult<SweepReport> {
        let report = SweepReport {
            invalid: self.remove_invalid()?,
            completed_unidentified: self.remove_completed_unidentified()?,
            orphaned: self.sanear()?,
            expired: self.remove_expired(self.clock.today())?,
        };
        debug!(?report, "sweep finished");
        Ok(report)
    }

    fn retain<F>(&self, pass: &str, keep: F) -> AgendaResult<usize>
    where
        F: Fn(&Appointment) -> bool,
    {
        let repo = AppointmentRepository::new(self.storage);
        let mut appointments = repo.all()?;
        let before = appointments.len();
        appointments.retain(|a| keep(a));

        let removed = before - appointments.len();
        if removed > 0 {
            repo.save_all(&appointments)?;
            info!(pass, removed, "removed appointments");
        }
        Ok(removed)
    }
}

/// Empty, or made only of dashes and whitespace.
fn is_placeholder(value: &str) -> bool {
    value
        .chars()
        .all(|c| c == '-' || c == '—' || c.is_whitespace())
}
