use agenda_core::Agenda;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(agenda: &Agenda) -> Result<()> {
    let notifications = agenda.notifications()?;

    if notifications.is_empty() {
        println!("{}", "No pending notifications".dimmed());
        return Ok(());
    }

    for notification in &notifications {
        println!("{}", notification.render());
    }

    Ok(())
}
