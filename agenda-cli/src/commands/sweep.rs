use agenda_core::Agenda;
use anyhow::Result;

use crate::render::Render;

pub fn run(agenda: &Agenda) -> Result<()> {
    let report = agenda.sweep()?;
    println!("{}", report.render());

    Ok(())
}
