//! Service catalog administration: creating, editing, deleting and
//! toggling services, plus the demo catalog.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use crate::availability::{Availability, Slot};
use crate::clock::Clock;
use crate::constants::{DEFAULT_SERVICE_DURATION, DEFAULT_SERVICE_IMAGE};
use crate::error::{AgendaError, AgendaResult};
use crate::repo::ServiceRepository;
use crate::service::Service;
use crate::storage::Storage;
use crate::time::{normalize_time, parse_time};

/// A recurring time window offered on every selected date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeModule {
    pub start: String,
    pub end: String,
    /// Default capacity for each date
    pub capacity: u32,
}

impl TimeModule {
    pub fn new(start: &str, end: &str, capacity: u32) -> Self {
        TimeModule {
            start: normalize_time(start),
            end: normalize_time(end),
            capacity,
        }
    }

    /// Length in minutes. The end must be strictly after the start.
    pub fn duration(&self) -> AgendaResult<u32> {
        let (Some(start), Some(end)) = (parse_time(&self.start), parse_time(&self.end)) else {
            return Err(AgendaError::InvalidModule(format!(
                "unreadable time range {} - {}",
                self.start, self.end
            )));
        };
        if end <= start {
            return Err(AgendaError::InvalidModule(format!(
                "end {} must be after start {}",
                self.end, self.start
            )));
        }
        Ok((end - start).num_minutes() as u32)
    }
}

/// Everything the admin form collects for a service.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub name: String,
    pub category: String,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub description: String,
    pub featured: bool,
    pub active: bool,
    pub dates: BTreeSet<NaiveDate>,
    pub modules: Vec<TimeModule>,
    /// Per-date capacity that overrides a module's default, keyed by
    /// date and module start time
    pub capacity_overrides: HashMap<(NaiveDate, String), u32>,
}

impl ServiceDraft {
    /// Rebuild a draft from a stored service so it can be edited. Modules
    /// are the distinct slot times across all dates, and current capacities
    /// become per-date overrides.
    pub fn from_service(service: &Service) -> Self {
        let mut modules: Vec<TimeModule> = Vec::new();
        let mut capacity_overrides = HashMap::new();

        for (date, slots) in service.availability.iter() {
            for slot in slots {
                let start = normalize_time(&slot.time);
                if !modules.iter().any(|m| m.start == start) {
                    let end = parse_time(&start)
                        .map(|t| t + Duration::minutes(i64::from(slot.duration)))
                        .map(|t| t.format("%H:%M").to_string())
                        .unwrap_or_else(|| start.clone());
                    modules.push(TimeModule {
                        start: start.clone(),
                        end,
                        capacity: slot.capacity,
                    });
                }
                capacity_overrides.insert((*date, start), slot.capacity);
            }
        }

        ServiceDraft {
            name: service.name.clone(),
            category: service.category.clone(),
            price: Some(service.price),
            image: Some(service.image.clone()).filter(|i| !i.is_empty()),
            description: service.description.clone(),
            featured: service.featured,
            active: service.active,
            dates: service.availability.dates().into_iter().collect(),
            modules,
            capacity_overrides,
        }
    }

    pub fn validate(&self) -> AgendaResult<()> {
        if self.name.trim().is_empty() {
            return Err(AgendaError::MissingField("name"));
        }
        if self.category.trim().is_empty() {
            return Err(AgendaError::MissingField("category"));
        }
        if !self.price.is_some_and(|p| p.is_finite() && p >= 0.0) {
            return Err(AgendaError::MissingField("price"));
        }
        if self.active && self.dates.is_empty() {
            return Err(AgendaError::ActiveServiceIncomplete("at least one date"));
        }
        if self.active && self.modules.is_empty() {
            return Err(AgendaError::ActiveServiceIncomplete("at least one time module"));
        }
        for module in &self.modules {
            module.duration()?;
        }
        Ok(())
    }

    /// Minutes of the first module, or the default when there is none.
    pub fn duration(&self) -> u32 {
        self.modules
            .first()
            .and_then(|m| m.duration().ok())
            .unwrap_or(DEFAULT_SERVICE_DURATION)
    }

    /// One slot per module on every selected date.
    pub fn build_availability(&self) -> AgendaResult<Availability> {
        let mut availability = Availability::new();
        for date in &self.dates {
            let slots = self
                .modules
                .iter()
                .map(|m| {
                    let capacity = self
                        .capacity_overrides
                        .get(&(*date, m.start.clone()))
                        .copied()
                        .unwrap_or(m.capacity);
                    Ok(Slot::new(&m.start, capacity, m.duration()?))
                })
                .collect::<AgendaResult<Vec<_>>>()?;
            availability.set_slots_for_date(*date, slots);
        }
        Ok(availability)
    }

    fn into_service(self, id: String, availability: Availability) -> Service {
        let duration = self.duration();
        let mut service = Service {
            id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.price.unwrap_or_default(),
            duration,
            image: self
                .image
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_IMAGE.to_string()),
            description: self.description,
            featured: self.featured,
            active: self.active,
            availability,
            dates: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        service.sync_dates();
        service
    }
}

pub struct Catalog<'a> {
    storage: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> Catalog<'a> {
    pub fn new(storage: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        Catalog { storage, clock }
    }

    pub fn create(&self, draft: ServiceDraft) -> AgendaResult<Service> {
        draft.validate()?;
        let availability = draft.build_availability()?;

        let repo = ServiceRepository::new(self.storage);
        let mut services = repo.all()?;

        let taken = repo.stored_ids()?.unwrap_or_default();
        let mut stamp = self.clock.now().timestamp_millis();
        while taken.contains(&stamp.to_string())
            || services.iter().any(|s| s.id == stamp.to_string())
        {
            stamp += 1;
        }

        let mut service = draft.into_service(stamp.to_string(), availability);
        service.created_at = Some(self.clock.now().with_timezone(&Utc));

        services.push(service.clone());
        repo.save_all(&services)?;

        info!(
            service = %service.id,
            name = %service.name,
            dates = service.dates.len(),
            "service created"
        );
        Ok(service)
    }

    /// Replace a service's fields and availability. The id and creation
    /// time are kept.
    pub fn update(&self, id: &str, draft: ServiceDraft) -> AgendaResult<Service> {
        let repo = ServiceRepository::new(self.storage);
        let mut services = repo.all()?;
        let index = services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AgendaError::ServiceNotFound(id.to_string()))?;

        draft.validate()?;
        let availability = draft.build_availability()?;

        let mut service = draft.into_service(id.to_string(), availability);
        service.created_at = services[index].created_at;
        service.updated_at = Some(self.clock.now().with_timezone(&Utc));

        services[index] = service.clone();
        repo.save_all(&services)?;

        info!(service = %service.id, "service updated");
        Ok(service)
    }

    /// Remove a service. Its appointments become orphans and are dropped by
    /// the next sanitize pass.
    pub fn delete(&self, id: &str) -> AgendaResult<Service> {
        let repo = ServiceRepository::new(self.storage);
        let mut services = repo.all()?;
        let index = services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AgendaError::ServiceNotFound(id.to_string()))?;

        let removed = services.remove(index);
        repo.save_all(&services)?;

        info!(service = %removed.id, "service deleted");
        Ok(removed)
    }

    /// Flip the active flag. A service with no remaining capacity cannot be
    /// switched on.
    pub fn toggle_active(&self, id: &str) -> AgendaResult<Service> {
        let repo = ServiceRepository::new(self.storage);
        let mut services = repo.all()?;
        let service = services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AgendaError::ServiceNotFound(id.to_string()))?;

        if !service.active && !service.availability.has_any_capacity() {
            return Err(AgendaError::ActiveServiceIncomplete("available capacity"));
        }

        service.active = !service.active;
        service.updated_at = Some(self.clock.now().with_timezone(&Utc));
        let toggled = service.clone();
        repo.save_all(&services)?;

        info!(service = %toggled.id, active = toggled.active, "service toggled");
        Ok(toggled)
    }

    /// Fill an empty catalog with the demo services. Returns `None` when
    /// services already exist.
    pub fn seed_demo(&self) -> AgendaResult<Option<Vec<Service>>> {
        let repo = ServiceRepository::new(self.storage);
        if !repo.all()?.is_empty() {
            return Ok(None);
        }

        let services = demo_services(self.clock.today());
        repo.save_all(&services)?;

        info!(count = services.len(), "seeded demo catalog");
        Ok(Some(services))
    }
}

/// Three sample services with availability in the days after `today`.
pub fn demo_services(today: NaiveDate) -> Vec<Service> {
    struct Demo {
        id: &'static str,
        name: &'static str,
        category: &'static str,
        price: f64,
        minutes: u32,
        capacity: u32,
        image: &'static str,
        description: &'static str,
        featured: bool,
        offsets: &'static [i64],
    }

    let demos = [
        Demo {
            id: "1",
            name: "Masaje Relajante",
            category: "bienestar",
            price: 60.0,
            minutes: 60,
            capacity: 4,
            image: DEFAULT_SERVICE_IMAGE,
            description: "Sesión de masaje terapéutico para aliviar tensiones y estrés. Incluye aromaterapia.",
            featured: true,
            offsets: &[2, 3, 4],
        },
        Demo {
            id: "2",
            name: "Corte de Cabello Premium",
            category: "belleza",
            price: 35.0,
            minutes: 45,
            capacity: 6,
            image: "https://images.unsplash.com/photo-1560066984-138dadb4c035",
            description: "Corte profesional con lavado, tratamiento y acabado premium.",
            featured: true,
            offsets: &[1, 8, 15],
        },
        Demo {
            id: "3",
            name: "Facial Rejuvenecedor",
            category: "belleza",
            price: 80.0,
            minutes: 90,
            capacity: 3,
            image: "https://images.unsplash.com/photo-1570172619644-dfd03ed5d881",
            description: "Tratamiento facial completo con productos premium para rejuvenecer la piel.",
            featured: false,
            offsets: &[7, 14],
        },
    ];

    demos
        .into_iter()
        .map(|demo| {
            let mut availability = Availability::new();
            for offset in demo.offsets {
                let date = today + Duration::days(*offset);
                availability.set_slots_for_date(
                    date,
                    vec![
                        Slot::new("10:00", demo.capacity, demo.minutes),
                        Slot::new("15:00", demo.capacity, demo.minutes),
                    ],
                );
            }
            let mut service = Service {
                id: demo.id.to_string(),
                name: demo.name.to_string(),
                category: demo.category.to_string(),
                price: demo.price,
                duration: demo.minutes,
                image: demo.image.to_string(),
                description: demo.description.to_string(),
                featured: demo.featured,
                active: true,
                availability,
                dates: Vec::new(),
                created_at: None,
                updated_at: None,
            };
            service.sync_dates();
            service
        })
        .collect()
}
