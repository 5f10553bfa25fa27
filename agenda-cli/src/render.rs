//! Terminal rendering for agenda types.
//!
//! Extension traits that add colored output to agenda-core types using
//! owo_colors.

use agenda_core::format::{format_long_date, format_money, format_short_date};
use agenda_core::time::{format_date, format_time_display};
use agenda_core::{
    Appointment, CatalogStats, Notification, NotificationKind, RescheduleStatus, Role, Service,
    Session, Slot, SweepReport,
};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Service {
    fn render(&self) -> String {
        let marker = if self.active {
            "●".green().to_string()
        } else {
            "○".dimmed().to_string()
        };
        let featured = if self.featured {
            format!(" {}", "★".yellow())
        } else {
            String::new()
        };

        format!(
            "{} {}{}  {}  {}  {}",
            marker,
            self.name.bold(),
            featured,
            self.category.cyan(),
            format_money(self.price),
            format!("{} min  [{}]", self.duration, self.id).dimmed()
        )
    }
}

impl Render for Slot {
    fn render(&self) -> String {
        let time = format_time_display(&self.time);
        match self.capacity {
            0 => format!("{} {}", time.dimmed(), "(full)".red()),
            n => format!("{} ({} left)", time, n),
        }
    }
}

/// A service's availability, one line per date, with slot numbers for
/// `agenda book --slot`.
pub fn render_availability(service: &Service, from: NaiveDate) -> Vec<String> {
    service
        .availability
        .iter()
        .filter(|(date, _)| **date >= from)
        .map(|(date, slots)| {
            let slots: Vec<String> = slots
                .iter()
                .enumerate()
                .map(|(i, slot)| format!("{} {}", format!("#{}", i).dimmed(), slot.render()))
                .collect();
            let slots = if slots.is_empty() {
                "no slots".dimmed().to_string()
            } else {
                slots.join("  ")
            };
            format!(
                "     {:<8} {}  {}",
                format_short_date(&format_date(*date)),
                format_date(*date).dimmed(),
                slots
            )
        })
        .collect()
}

impl Render for Appointment {
    fn render(&self) -> String {
        let edited = if self.edited {
            format!(" {}", "(edited)".yellow())
        } else {
            String::new()
        };
        let contact = if self.contact.name.is_empty() {
            "-".to_string()
        } else {
            self.contact.name.clone()
        };
        let phone = if self.contact.phone.is_empty() {
            "-".to_string()
        } else {
            self.contact.phone.clone()
        };

        format!(
            "{}  {}{}  {} {}  {}  {}",
            format_long_date(&format_date(self.date)).bold(),
            self.service_name,
            edited,
            format_time_display(&self.time).cyan(),
            contact,
            phone.dimmed(),
            format!("[{}]", self.id).dimmed()
        )
    }
}

impl Render for RescheduleStatus {
    fn render(&self) -> String {
        match self {
            RescheduleStatus::Allowed => "can reschedule".green().to_string(),
            RescheduleStatus::TooLate => "less than 24h left".yellow().to_string(),
            RescheduleStatus::Expired => "past".dimmed().to_string(),
        }
    }
}

impl Render for Session {
    fn render(&self) -> String {
        let role = match self.role {
            Role::Admin => "admin".magenta().to_string(),
            Role::Client => "client".green().to_string(),
            Role::Guest => "guest".dimmed().to_string(),
        };
        let email = if self.email.is_empty() {
            String::new()
        } else {
            format!(" <{}>", self.email)
        };
        format!("{}{} ({})", self.name.bold(), email, role)
    }
}

impl Render for Notification {
    fn render(&self) -> String {
        let label = match self.kind {
            NotificationKind::New => "New booking".green().to_string(),
            NotificationKind::Upcoming => "Within 24h".yellow().to_string(),
        };
        let a = &self.appointment;
        let mut channels = Vec::new();
        if !a.contact.email.is_empty() {
            channels.push(a.contact.email.clone());
        }
        if !a.contact.phone.is_empty() {
            channels.push(a.contact.phone.clone());
        }

        format!(
            "{}  {} - {} - {} {}  {}",
            label,
            a.contact.name,
            a.service_name,
            format_date(a.date),
            format_time_display(&a.time),
            channels.join(", ").dimmed()
        )
    }
}

impl Render for CatalogStats {
    fn render(&self) -> String {
        [
            format!("  Services:  {}", self.total),
            format!("  Active:    {}", self.active.green()),
            format!("  Featured:  {}", self.featured.yellow()),
            format!("  Capacity:  {}", self.capacity),
        ]
        .join("\n")
    }
}

impl Render for SweepReport {
    fn render(&self) -> String {
        if self.total() == 0 {
            return "Nothing to clean up".dimmed().to_string();
        }

        let parts: Vec<String> = [
            (self.invalid, "invalid"),
            (self.completed_unidentified, "completed without id"),
            (self.orphaned, "orphaned"),
            (self.expired, "past"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        format!(
            "Removed {} {}: {}",
            self.total(),
            pluralize("appointment", self.total()),
            parts.join(", ")
        )
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
