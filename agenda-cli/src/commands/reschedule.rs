use agenda_core::Agenda;
use agenda_core::format::format_long_date;
use agenda_core::time::{format_date, normalize_time};
use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::{manageable_appointment, parse_date_arg};
use crate::render::Render;

pub fn run(agenda: &Agenda, appointment_id: &str, date: &str, time: &str, force: bool) -> Result<()> {
    let appointment = manageable_appointment(agenda, appointment_id)?;
    let date = parse_date_arg(date)?;

    if !force {
        println!("{}", appointment.render());
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Move to {} at {}?",
                format_long_date(&format_date(date)),
                normalize_time(time)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let moved = agenda.reprogram(appointment_id, date, time)?;

    println!("{}", "Rescheduled".green());
    println!("{}", moved.render());

    Ok(())
}
