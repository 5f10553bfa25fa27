use agenda_core::{Agenda, ServiceDraft, TimeModule};
use anyhow::{Context, Result, bail};
use clap::Args;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;

use super::parse_date_arg;
use crate::render::Render;

#[derive(Args)]
pub struct ServiceArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub featured: Option<bool>,

    #[arg(long)]
    pub active: Option<bool>,

    /// Bookable date (YYYY-MM-DD); repeat for more. Replaces existing dates.
    #[arg(long = "date")]
    pub dates: Vec<String>,

    /// Time module as START-END, e.g. 10:00-10:50; repeat for more.
    /// Replaces existing modules.
    #[arg(long = "module")]
    pub modules: Vec<String>,

    /// Capacity of each new module on each date
    #[arg(long, default_value_t = 1)]
    pub capacity: u32,

    /// Capacity for one date and module as DATE@START=N, e.g. 2030-06-12@10:00=4
    #[arg(long = "cupos")]
    pub overrides: Vec<String>,
}

impl ServiceArgs {
    /// Apply the given flags on top of `draft`.
    fn apply(self, draft: &mut ServiceDraft) -> Result<()> {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(price) = self.price {
            draft.price = Some(price);
        }
        if let Some(image) = self.image {
            draft.image = Some(image);
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(featured) = self.featured {
            draft.featured = featured;
        }
        if let Some(active) = self.active {
            draft.active = active;
        }

        if !self.dates.is_empty() {
            draft.dates = self
                .dates
                .iter()
                .map(|d| parse_date_arg(d))
                .collect::<Result<_>>()?;
        }

        if !self.modules.is_empty() {
            draft.modules = self
                .modules
                .iter()
                .map(|m| parse_module(m, self.capacity))
                .collect::<Result<_>>()?;
        }

        for raw in &self.overrides {
            let (date, start, capacity) = parse_override(raw)?;
            draft.capacity_overrides.insert((date, start), capacity);
        }

        Ok(())
    }
}

fn parse_module(input: &str, capacity: u32) -> Result<TimeModule> {
    let Some((start, end)) = input.split_once('-') else {
        bail!("Invalid module '{}'. Use START-END, e.g. 10:00-10:50.", input);
    };
    Ok(TimeModule::new(start, end, capacity))
}

fn parse_override(input: &str) -> Result<(chrono::NaiveDate, String, u32)> {
    let parsed = input.split_once('@').and_then(|(date, rest)| {
        let (start, capacity) = rest.split_once('=')?;
        Some((date, start, capacity))
    });
    let Some((date, start, capacity)) = parsed else {
        bail!("Invalid capacity '{}'. Use DATE@START=N.", input);
    };

    let capacity: u32 = capacity
        .trim()
        .parse()
        .with_context(|| format!("Invalid capacity in '{}'", input))?;

    Ok((
        parse_date_arg(date)?,
        agenda_core::time::normalize_time(start),
        capacity,
    ))
}

pub fn add(agenda: &Agenda, args: ServiceArgs) -> Result<()> {
    let mut draft = ServiceDraft::default();
    args.apply(&mut draft)?;

    // Prompt for the required fields the flags did not cover
    if draft.name.trim().is_empty() {
        draft.name = Input::<String>::new().with_prompt("  Name").interact_text()?;
    }
    if draft.category.trim().is_empty() {
        draft.category = Input::<String>::new()
            .with_prompt("  Category")
            .interact_text()?;
    }
    if draft.price.is_none() {
        draft.price = Some(Input::<f64>::new().with_prompt("  Price").interact_text()?);
    }

    let service = agenda.create_service(draft)?;
    println!("{}", format!("Created: {}", service.name).green());
    println!("{}", service.render());

    Ok(())
}

pub fn edit(agenda: &Agenda, id: &str, args: ServiceArgs) -> Result<()> {
    let current = agenda.get_service(id)?;
    let mut draft = ServiceDraft::from_service(&current);
    args.apply(&mut draft)?;

    let service = agenda.update_service(id, draft)?;
    println!("{}", format!("Updated: {}", service.name).green());
    println!("{}", service.render());

    Ok(())
}

pub fn delete(agenda: &Agenda, id: &str, force: bool) -> Result<()> {
    let service = agenda.get_service(id)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", service.name))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    agenda.delete_service(id)?;
    println!("Deleted: {}", service.name);

    Ok(())
}

pub fn toggle(agenda: &Agenda, id: &str) -> Result<()> {
    let service = agenda.toggle_service_active(id)?;
    let state = if service.active {
        "activated".green().to_string()
    } else {
        "deactivated".yellow().to_string()
    };
    println!("{} {}", service.name.bold(), state);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_module() {
        let module = parse_module("9:00-9:45", 2).unwrap();
        assert_eq!(module.start, "09:00");
        assert_eq!(module.end, "09:45");
        assert_eq!(module.capacity, 2);
        assert!(parse_module("9:00", 2).is_err());
    }

    #[test]
    fn test_parse_override() {
        let (date, start, capacity) = parse_override("2030-06-12@4:00 PM=5").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2030, 6, 12).unwrap());
        assert_eq!(start, "16:00");
        assert_eq!(capacity, 5);

        assert!(parse_override("2030-06-12=5").is_err());
        assert!(parse_override("2030-06-12@10:00=many").is_err());
    }
}
