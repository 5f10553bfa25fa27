use agenda_core::Agenda;
use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::render::pluralize;

pub fn run(agenda: &Agenda, force: bool) -> Result<()> {
    // Two confirmations: this cannot be undone
    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL appointments?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }

        let confirmed = Confirm::new()
            .with_prompt("This cannot be undone. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    let count = agenda.clear_appointments()?;
    println!(
        "{}",
        format!("Deleted {} {}", count, pluralize("appointment", count)).red()
    );

    Ok(())
}
