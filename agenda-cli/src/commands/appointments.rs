use agenda_core::{Agenda, AppointmentFilter};
use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::parse_date_arg;
use crate::render::Render;

pub fn run(
    agenda: &Agenda,
    mine: bool,
    service: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let Some(session) = agenda.session()? else {
        bail!("Not signed in.\n\nSign in with:\n  agenda login guest");
    };

    let owner = if mine || !session.is_admin() {
        Some(session.clone())
    } else {
        None
    };

    let filter = AppointmentFilter {
        service_id: service,
        date: date.as_deref().map(parse_date_arg).transpose()?,
        owner,
    };

    let appointments = agenda.list_appointments(&filter)?;
    if appointments.is_empty() {
        println!("{}", "No appointments".dimmed());
        return Ok(());
    }

    let now = agenda.now();
    for appointment in &appointments {
        println!("{}", appointment.render());
        if !session.is_admin() {
            println!("     {}", appointment.reschedule_status(now).render());
        }
    }

    Ok(())
}
