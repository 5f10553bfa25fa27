use agenda_core::Agenda;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn whoami(agenda: &Agenda) -> Result<()> {
    match agenda.session()? {
        Some(session) => println!("{}", session.render()),
        None => println!("{}", "Not signed in".dimmed()),
    }

    Ok(())
}

pub fn logout(agenda: &Agenda) -> Result<()> {
    agenda.logout()?;
    println!("Signed out");

    Ok(())
}
