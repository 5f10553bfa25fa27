use agenda_core::Agenda;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(agenda: &Agenda) -> Result<()> {
    match agenda.seed_demo_services()? {
        Some(services) => {
            println!("{}", "Added demo services".green());
            for service in &services {
                println!("{}", service.render());
            }
        }
        None => println!("{}", "Catalog is not empty, nothing to seed".dimmed()),
    }

    Ok(())
}
