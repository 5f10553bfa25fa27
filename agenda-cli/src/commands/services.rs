use agenda_core::{Agenda, ServiceFilter, StatusFilter};
use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::parse_date_arg;
use crate::render::{Render, render_availability};

pub fn run(
    agenda: &Agenda,
    category: Option<String>,
    search: Option<String>,
    date: Option<String>,
    status: Option<String>,
    slots: bool,
) -> Result<()> {
    let is_admin = agenda.session()?.is_some_and(|s| s.is_admin());

    let status = match status.as_deref() {
        _ if !is_admin => StatusFilter::Active,
        None | Some("all") => StatusFilter::All,
        Some("active") => StatusFilter::Active,
        Some("inactive") => StatusFilter::Inactive,
        Some(other) => bail!("Unknown status '{}'. Use all, active or inactive.", other),
    };

    let filter = ServiceFilter {
        category,
        status,
        search,
        date: date.as_deref().map(parse_date_arg).transpose()?,
    };

    let services = agenda.list_services(&filter)?;
    if services.is_empty() {
        println!("{}", "No services match".dimmed());
        return Ok(());
    }

    let today = agenda.now().date_naive();
    for service in &services {
        println!("{}", service.render());
        if slots {
            for line in render_availability(service, today) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
