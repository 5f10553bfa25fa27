pub mod appointments;
pub mod book;
pub mod cancel;
pub mod clear;
pub mod complete;
pub mod config;
pub mod login;
pub mod notifications;
pub mod register;
pub mod reschedule;
pub mod seed;
pub mod service;
pub mod services;
pub mod session;
pub mod stats;
pub mod sweep;

use agenda_core::time::parse_date;
use agenda_core::{Agenda, Appointment};
use anyhow::{Result, bail};
use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_date_arg(input: &str) -> Result<NaiveDate> {
    match parse_date(input) {
        Some(date) => Ok(date),
        None => bail!("Invalid date '{}'. Use YYYY-MM-DD.", input),
    }
}

/// Load an appointment the current session may change: admins can change
/// any appointment, everyone else only their own.
pub fn manageable_appointment(agenda: &Agenda, id: &str) -> Result<Appointment> {
    let appointment = agenda.get_appointment(id)?;
    let Some(session) = agenda.session()? else {
        bail!("Not signed in.\n\nSign in with:\n  agenda login guest");
    };

    if !session.is_admin() && !appointment.belongs_to(&session) {
        bail!("Appointment {} does not belong to {}", id, session.name);
    }

    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2030-06-12").unwrap(),
            NaiveDate::from_ymd_opt(2030, 6, 12).unwrap()
        );
        assert!(parse_date_arg("12 june").is_err());
    }
}
