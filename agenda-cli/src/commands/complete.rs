use agenda_core::Agenda;
use agenda_core::format::format_money;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(agenda: &Agenda, appointment_id: &str) -> Result<()> {
    let done = agenda.complete_appointment(appointment_id)?;

    println!(
        "{} {} for {}",
        "Completed".green(),
        done.service_name,
        done.contact.name
    );
    println!(
        "  Projected revenue: {}",
        format_money(agenda.projected_revenue()?)
    );

    Ok(())
}
