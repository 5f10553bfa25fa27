//! Catalog and appointment list filters.

use chrono::NaiveDate;

use crate::appointment::Appointment;
use crate::service::Service;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub category: Option<String>,
    pub status: StatusFilter,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// Only services offering this date
    pub date: Option<NaiveDate>,
}

impl ServiceFilter {
    /// What clients browse: active services only.
    pub fn client() -> Self {
        ServiceFilter {
            status: StatusFilter::Active,
            ..Default::default()
        }
    }

    pub fn matches(&self, service: &Service) -> bool {
        if let Some(category) = &self.category {
            if service.category != *category {
                return false;
            }
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active if !service.active => return false,
            StatusFilter::Inactive if service.active => return false,
            _ => {}
        }

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !service.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }

        self.date.is_none_or(|date| service.offers_date(date))
    }

    pub fn apply<'s>(&self, services: &'s [Service]) -> Vec<&'s Service> {
        services.iter().filter(|s| self.matches(s)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub service_id: Option<String>,
    pub date: Option<NaiveDate>,
    /// Only appointments belonging to this session
    pub owner: Option<Session>,
}

impl AppointmentFilter {
    pub fn owned_by(session: Session) -> Self {
        AppointmentFilter {
            owner: Some(session),
            ..Default::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.service_id
            .as_deref()
            .is_none_or(|id| appointment.service_id == id)
            && self.date.is_none_or(|date| appointment.date == date)
            && self
                .owner
                .as_ref()
                .is_none_or(|session| appointment.belongs_to(session))
    }
}
