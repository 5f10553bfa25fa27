use agenda_core::time::format_date;
use agenda_core::{Agenda, ContactInput};
use anyhow::{Result, bail};
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

use super::parse_date_arg;
use crate::render::Render;

pub fn run(
    agenda: &Agenda,
    service_id: &str,
    date: Option<String>,
    slot: Option<usize>,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let service = agenda.get_service(service_id)?;
    if !service.active {
        bail!("\"{}\" is not taking bookings right now", service.name);
    }
    let session = agenda.session()?;

    // --- Date ---
    let date = match date {
        Some(d) => parse_date_arg(&d)?,
        None => {
            let today = agenda.now().date_naive();
            let upcoming: Vec<_> = service.dates.iter().filter(|d| **d >= today).copied().collect();
            if upcoming.is_empty() {
                bail!("\"{}\" has no upcoming dates", service.name);
            }
            let labels: Vec<String> = upcoming.iter().map(|d| format_date(*d)).collect();
            let choice = Select::new()
                .with_prompt("  Date")
                .items(&labels)
                .default(0)
                .interact()?;
            upcoming[choice]
        }
    };

    // --- Slot ---
    let slot = match slot {
        Some(i) => i,
        None => {
            let slots = service.availability.slots_for(date).unwrap_or_default();
            if slots.is_empty() {
                bail!("\"{}\" has no slots on {}", service.name, date);
            }
            let labels: Vec<String> = slots.iter().map(|s| s.render()).collect();
            Select::new()
                .with_prompt("  Time")
                .items(&labels)
                .default(0)
                .interact()?
        }
    };

    // --- Contact ---
    let has_session_name = session.as_ref().is_some_and(|s| !s.name.trim().is_empty());
    let name = match name {
        Some(n) => n,
        None if has_session_name => String::new(),
        None => Input::<String>::new().with_prompt("  Name").interact_text()?,
    };

    let phone = match phone {
        Some(p) => p,
        None => Input::<String>::new().with_prompt("  Phone").interact_text()?,
    };

    let needs_email = session
        .as_ref()
        .is_none_or(|s| s.requires_email() && s.email.trim().is_empty());
    let email = match email {
        Some(e) => e,
        None if needs_email => Input::<String>::new().with_prompt("  Email").interact_text()?,
        None => String::new(),
    };

    let contact = ContactInput { name, phone, email };
    let appointment = agenda.book(&service.id, date, slot, &contact)?;

    println!("{}", "Booked".green());
    println!("{}", appointment.render());

    Ok(())
}
