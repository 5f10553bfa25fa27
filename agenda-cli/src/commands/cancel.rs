use agenda_core::Agenda;
use anyhow::Result;
use dialoguer::Confirm;

use super::manageable_appointment;
use crate::render::Render;

pub fn run(agenda: &Agenda, appointment_id: &str, force: bool) -> Result<()> {
    let appointment = manageable_appointment(agenda, appointment_id)?;

    if !force {
        println!("{}", appointment.render());
        let confirmed = Confirm::new()
            .with_prompt("Cancel this appointment?")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let cancelled = agenda.cancel_appointment(appointment_id)?;
    println!("Cancelled: {} on {}", cancelled.service_name, cancelled.date);

    Ok(())
}
