use agenda_core::Agenda;
use agenda_core::format::format_money;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(agenda: &Agenda) -> Result<()> {
    let stats = agenda.stats()?;
    let revenue = agenda.projected_revenue()?;

    println!("{}", "Catalog".bold());
    println!("{}", stats.render());
    println!();
    println!("{}", "Appointments".bold());
    println!("  Projected revenue:  {}", format_money(revenue).green());

    Ok(())
}
