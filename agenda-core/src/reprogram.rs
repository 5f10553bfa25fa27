//! Moving an existing appointment to another date or time.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::appointment::{Appointment, RescheduleStatus};
use crate::availability::SlotLocator;
use crate::clock::Clock;
use crate::error::{AgendaError, AgendaResult};
use crate::repo::{AppointmentRepository, ServiceRepository};
use crate::storage::Storage;
use crate::time::normalize_time;

pub struct ReprogramEngine<'a> {
    storage: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> ReprogramEngine<'a> {
    pub fn new(storage: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        ReprogramEngine { storage, clock }
    }

    /// Move an appointment to `new_time` on `new_date` of `service_id`.
    ///
    /// The original slot gets its unit back (if it still exists), the target
    /// slot loses one, and the appointment is re-appended with `editado` set.
    /// Only allowed while at least the minimum notice remains before the
    /// original start.
    pub fn reprogram(
        &self,
        appointment_id: &str,
        service_id: &str,
        new_date: NaiveDate,
        new_time: &str,
    ) -> AgendaResult<Appointment> {
        let appointments_repo = AppointmentRepository::new(self.storage);
        let mut appointments = appointments_repo.all()?;

        let position = appointments
            .iter()
            .position(|a| a.id == appointment_id)
            .ok_or_else(|| AgendaError::AppointmentNotFound(appointment_id.to_string()))?;

        match appointments[position].reschedule_status(self.clock.now()) {
            RescheduleStatus::Allowed => {}
            RescheduleStatus::TooLate => return Err(AgendaError::TooLateToReprogram),
            RescheduleStatus::Expired => return Err(AgendaError::AppointmentExpired),
        }

        let new_time = normalize_time(new_time);
        let current = &appointments[position];
        if current.service_id == service_id
            && current.date == new_date
            && normalize_time(&current.time) == new_time
        {
            return Err(AgendaError::NoChangeRequested);
        }

        let services_repo = ServiceRepository::new(self.storage);
        let mut services = services_repo.all()?;

        let target = services
            .iter()
            .position(|s| s.id == service_id)
            .filter(|i| services[*i].availability.slots_for(new_date).is_some())
            .ok_or(AgendaError::DateUnavailable(new_date))?;

        let locator = SlotLocator::time(&new_time);
        let slot = services[target]
            .availability
            .find_slot(new_date, &locator)
            .map_err(|_| AgendaError::SlotInvalid {
                date: new_date,
                slot: new_time.clone(),
            })?;
        if slot.capacity == 0 {
            return Err(AgendaError::SlotExhausted {
                date: new_date,
                time: new_time,
            });
        }

        let original = appointments.remove(position);

        let released = services
            .iter_mut()
            .find(|s| s.id == original.service_id)
            .map(|s| {
                s.availability
                    .increment_capacity(original.date, &SlotLocator::time(&original.time), 1)
            })
            .is_some_and(|r| r.is_ok());
        if !released {
            debug!(appointment = %original.id, "original slot is gone, nothing to release");
        }

        let service = &mut services[target];
        service.availability.decrement_capacity(new_date, &locator, 1)?;
        let deactivated = service.deactivate_if_exhausted();

        let moved = Appointment {
            service_id: service.id.clone(),
            date: new_date,
            time: new_time,
            edited: true,
            edited_at: Some(self.clock.now().with_timezone(&Utc)),
            ..original.clone()
        };
        appointments.push(moved.clone());

        appointments_repo.save_all(&appointments)?;
        services_repo.save_all(&services)?;

        info!(
            appointment = %moved.id,
            from = %format!("{} {}", original.date, original.time),
            to = %format!("{} {}", moved.date, moved.time),
            deactivated,
            "appointment rescheduled"
        );

        Ok(moved)
    }
}
