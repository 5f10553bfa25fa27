//! Booked appointments.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_RESCHEDULE_NOTICE_HOURS;
use crate::session::Session;
use crate::time::{appointment_start, to_local};

/// Contact details captured at booking time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// One booked unit of capacity.
///
/// Service name and price are snapshots taken at booking time; later catalog
/// edits do not change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "servicioId", default)]
    pub service_id: String,
    #[serde(rename = "nombre", default)]
    pub service_name: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "hora", default)]
    pub time: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "creadoEn", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "contacto", default)]
    pub contact: Contact,
    #[serde(rename = "editado", default)]
    pub edited: bool,
    #[serde(rename = "fechaEdicion", default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    /// Legacy status marker; `completada` means the service was delivered
    #[serde(rename = "estado", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Whether an appointment can still be moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleStatus {
    Allowed,
    /// Less than the minimum notice remains
    TooLate,
    /// Already started or in the past
    Expired,
}

impl Appointment {
    pub fn has_valid_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("completada"))
    }

    /// Local wall-clock start.
    pub fn start(&self) -> NaiveDateTime {
        appointment_start(self.date, &self.time)
    }

    pub fn time_until_start(&self, now: DateTime<Local>) -> Duration {
        to_local(self.start()) - now
    }

    pub fn reschedule_status(&self, now: DateTime<Local>) -> RescheduleStatus {
        let remaining = self.time_until_start(now);
        if remaining < Duration::zero() {
            RescheduleStatus::Expired
        } else if remaining < Duration::hours(MIN_RESCHEDULE_NOTICE_HOURS) {
            RescheduleStatus::TooLate
        } else {
            RescheduleStatus::Allowed
        }
    }

    /// Ownership check for "my appointments": by user id when both sides
    /// have one, otherwise by case-insensitive contact name.
    pub fn belongs_to(&self, session: &Session) -> bool {
        if let Some(user_id) = self.contact.user_id.as_deref().filter(|u| !u.is_empty()) {
            if !session.id.is_empty() {
                return user_id == session.id;
            }
        }

        let own = self.contact.name.trim();
        let theirs = session.name.trim();
        !own.is_empty() && !theirs.is_empty() && own.to_lowercase() == theirs.to_lowercase()
    }
}
