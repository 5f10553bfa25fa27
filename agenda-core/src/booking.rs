//! Booking, cancelling and completing appointments.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, info};

use crate::appointment::{Appointment, Contact};
use crate::availability::SlotLocator;
use crate::clock::Clock;
use crate::constants::MIN_PHONE_DIGITS;
use crate::error::{AgendaError, AgendaResult};
use crate::repo::{AppointmentRepository, ServiceRepository};
use crate::session::Session;
use crate::storage::Storage;
use crate::time::normalize_time;

/// Contact details as typed by the person booking. Blank fields fall back
/// to the current session.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub phone: String,
    pub email: String,
}

pub struct BookingEngine<'a> {
    storage: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> BookingEngine<'a> {
    pub fn new(storage: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        BookingEngine { storage, clock }
    }

    /// Book one unit of capacity at the `slot_index`-th slot of `date`.
    ///
    /// Checks run in a fixed order and the first failure is returned. No
    /// store is touched unless every check passes.
    pub fn book(
        &self,
        service_id: &str,
        date: NaiveDate,
        slot_index: usize,
        input: &ContactInput,
        session: Option<&Session>,
    ) -> AgendaResult<Appointment> {
        let services_repo = ServiceRepository::new(self.storage);
        let mut services = services_repo.all()?;

        let service = services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| AgendaError::ServiceNotFound(service_id.to_string()))?;

        match service.availability.slots_for(date) {
            Some(slots) if !slots.is_empty() => {}
            _ => return Err(AgendaError::DateUnavailable(date)),
        }

        let slot = service
            .availability
            .slot_at(date, slot_index)
            .ok_or_else(|| AgendaError::SlotInvalid {
                date,
                slot: slot_index.to_string(),
            })?
            .clone();

        let contact = resolve_contact(input, session)?;

        if slot.capacity == 0 {
            return Err(AgendaError::SlotExhausted {
                date,
                time: normalize_time(&slot.time),
            });
        }

        let appointments_repo = AppointmentRepository::new(self.storage);
        let mut appointments = appointments_repo.all()?;

        let appointment = Appointment {
            id: self.next_appointment_id(&appointments),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            date,
            time: normalize_time(&slot.time),
            price: service.price,
            created_at: Some(self.clock.now().with_timezone(&Utc)),
            contact,
            edited: false,
            edited_at: None,
            status: None,
        };

        let left = service
            .availability
            .decrement_capacity(date, &SlotLocator::Index(slot_index), 1)?;
        let deactivated = service.deactivate_if_exhausted();

        appointments.push(appointment.clone());
        appointments_repo.save_all(&appointments)?;
        services_repo.save_all(&services)?;

        info!(
            appointment = %appointment.id,
            service = %appointment.service_id,
            date = %appointment.date,
            time = %appointment.time,
            "appointment booked"
        );
        debug!(remaining = left, deactivated, "slot capacity updated");

        Ok(appointment)
    }

    /// Cancel an appointment and give its unit of capacity back.
    ///
    /// If the slot no longer exists the release is skipped. A service that
    /// was deactivated for lack of capacity stays inactive.
    pub fn cancel(&self, appointment_id: &str) -> AgendaResult<Appointment> {
        let appointments_repo = AppointmentRepository::new(self.storage);
        let mut appointments = appointments_repo.all()?;

        let position = appointments
            .iter()
            .position(|a| a.id == appointment_id)
            .ok_or_else(|| AgendaError::AppointmentNotFound(appointment_id.to_string()))?;
        let appointment = appointments.remove(position);

        let services_repo = ServiceRepository::new(self.storage);
        let mut services = services_repo.all()?;
        let released = services
            .iter_mut()
            .find(|s| s.id == appointment.service_id)
            .map(|s| {
                s.availability.increment_capacity(
                    appointment.date,
                    &SlotLocator::time(&appointment.time),
                    1,
                )
            })
            .is_some_and(|r| r.is_ok());

        if released {
            services_repo.save_all(&services)?;
        } else {
            debug!(appointment = %appointment.id, "original slot is gone, nothing to release");
        }
        appointments_repo.save_all(&appointments)?;

        info!(appointment = %appointment.id, released, "appointment cancelled");
        Ok(appointment)
    }

    /// Mark an appointment as delivered. The record is removed and its
    /// capacity stays consumed.
    pub fn complete(&self, appointment_id: &str) -> AgendaResult<Appointment> {
        let appointments_repo = AppointmentRepository::new(self.storage);
        let mut appointments = appointments_repo.all()?;

        let position = appointments
            .iter()
            .position(|a| a.id == appointment_id)
            .ok_or_else(|| AgendaError::AppointmentNotFound(appointment_id.to_string()))?;
        let appointment = appointments.remove(position);
        appointments_repo.save_all(&appointments)?;

        info!(appointment = %appointment.id, "appointment completed");
        Ok(appointment)
    }

    /// Millisecond timestamp, bumped until unused.
    fn next_appointment_id(&self, existing: &[Appointment]) -> String {
        let mut stamp = self.clock.now().timestamp_millis();
        while existing.iter().any(|a| a.id == stamp.to_string()) {
            stamp += 1;
        }
        stamp.to_string()
    }
}

fn resolve_contact(input: &ContactInput, session: Option<&Session>) -> AgendaResult<Contact> {
    let name = match input.name.trim() {
        "" => session.map(|s| s.name.trim()).unwrap_or_default(),
        name => name,
    };
    if name.is_empty() {
        return Err(AgendaError::ContactNameRequired);
    }

    let phone = input.phone.trim();
    if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
        return Err(AgendaError::ContactPhoneInvalid);
    }

    let email = match input.email.trim() {
        "" => session.map(|s| s.email.trim()).unwrap_or_default(),
        email => email,
    };
    let email_required = session.is_none_or(Session::requires_email);
    if (email_required || !email.is_empty()) && !is_valid_email(email) {
        return Err(AgendaError::ContactEmailInvalid);
    }

    Ok(Contact {
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        user_id: session.map(|s| s.id.clone()).filter(|id| !id.is_empty()),
    })
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{Availability, Slot};
    use crate::clock::FixedClock;
    use crate::service::Service;
    use crate::session::Role;
    use crate::storage::{APPOINTMENTS_KEY, MemoryStorage, SERVICES_KEY};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 12).unwrap()
    }

    fn make_test_clock() -> FixedClock {
        FixedClock::at(
            NaiveDate::from_ymd_opt(2030, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    fn make_test_service(capacity: u32) -> Service {
        let mut availability = Availability::new();
        availability.set_slots_for_date(
            day(),
            vec![Slot::new("10:00", capacity, 60), Slot::new("4:00 PM", 3, 60)],
        );
        let mut service = Service {
            id: "svc-1".to_string(),
            name: "Masaje Relajante".to_string(),
            category: "Masajes".to_string(),
            price: 60000.0,
            duration: 60,
            image: String::new(),
            description: String::new(),
            featured: false,
            active: true,
            availability,
            dates: vec![],
            created_at: None,
            updated_at: None,
        };
        service.sync_dates();
        service
    }

    fn make_test_contact() -> ContactInput {
        ContactInput {
            name: "Ana".to_string(),
            phone: "+56 9 1234 5678".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    fn seeded(service: Service) -> MemoryStorage {
        let storage = MemoryStorage::new();
        ServiceRepository::new(&storage).save_all(&[service]).unwrap();
        storage
    }

    fn capacity_at(storage: &MemoryStorage, index: usize) -> u32 {
        let service = ServiceRepository::new(storage)
            .find("svc-1")
            .unwrap()
            .unwrap();
        service.availability.slot_at(day(), index).unwrap().capacity
    }

    #[test]
    fn test_book_consumes_one_unit() {
        let mut service = make_test_service(1);
        service.availability.set_slots_for_date(
            day(),
            vec![Slot::new("10:00", 2, 60), Slot::new("4:00 PM", 3, 60)],
        );
        let storage = seeded(service);
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);

        let appointment = engine
            .book("svc-1", day(), 1, &make_test_contact(), None)
            .unwrap();

        assert_eq!(appointment.time, "16:00");
        assert_eq!(appointment.service_name, "Masaje Relajante");
        assert_eq!(appointment.price, 60000.0);
        assert_eq!(appointment.id, clock.now().timestamp_millis().to_string());
        assert_eq!(capacity_at(&storage, 1), 2);
        assert_eq!(capacity_at(&storage, 0), 2);
        assert_eq!(AppointmentRepository::new(&storage).all().unwrap().len(), 1);
    }

    #[test]
    fn test_last_unit_deactivates_and_cancel_does_not_reactivate() {
        let mut service = make_test_service(1);
        service
            .availability
            .set_slots_for_date(day(), vec![Slot::new("10:00", 1, 60)]);
        let storage = seeded(service);
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);

        let appointment = engine
            .book("svc-1", day(), 0, &make_test_contact(), None)
            .unwrap();
        let service = ServiceRepository::new(&storage).find("svc-1").unwrap().unwrap();
        assert_eq!(capacity_at(&storage, 0), 0);
        assert!(!service.active);

        engine.cancel(&appointment.id).unwrap();
        let service = ServiceRepository::new(&storage).find("svc-1").unwrap().unwrap();
        assert_eq!(capacity_at(&storage, 0), 1);
        assert!(!service.active);
        assert!(AppointmentRepository::new(&storage).all().unwrap().is_empty());
    }

    #[test]
    fn test_exhausted_slot_writes_nothing() {
        let storage = seeded(make_test_service(0));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);
        let service_writes = storage.write_count(SERVICES_KEY);

        let result = engine.book("svc-1", day(), 0, &make_test_contact(), None);

        assert!(matches!(result, Err(AgendaError::SlotExhausted { .. })));
        assert_eq!(storage.write_count(SERVICES_KEY), service_writes);
        assert_eq!(storage.write_count(APPOINTMENTS_KEY), 0);
    }

    #[test]
    fn test_validation_order() {
        let storage = seeded(make_test_service(0));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);
        let contact = make_test_contact();

        assert!(matches!(
            engine.book("nope", day(), 0, &contact, None),
            Err(AgendaError::ServiceNotFound(_))
        ));
        assert!(matches!(
            engine.book("svc-1", day().succ_opt().unwrap(), 0, &contact, None),
            Err(AgendaError::DateUnavailable(_))
        ));
        assert!(matches!(
            engine.book("svc-1", day(), 5, &contact, None),
            Err(AgendaError::SlotInvalid { .. })
        ));

        // Contact checks run before the capacity check
        let mut bad = contact.clone();
        bad.name = "  ".to_string();
        assert!(matches!(
            engine.book("svc-1", day(), 0, &bad, None),
            Err(AgendaError::ContactNameRequired)
        ));

        let mut bad = contact.clone();
        bad.phone = "123-4567".to_string();
        assert!(matches!(
            engine.book("svc-1", day(), 0, &bad, None),
            Err(AgendaError::ContactPhoneInvalid)
        ));

        let mut bad = contact.clone();
        bad.email = "ana@example".to_string();
        assert!(matches!(
            engine.book("svc-1", day(), 0, &bad, None),
            Err(AgendaError::ContactEmailInvalid)
        ));
    }

    #[test]
    fn test_contact_falls_back_to_session() {
        let storage = seeded(make_test_service(2));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);
        let session = Session {
            id: "USER-42".to_string(),
            name: "Beatriz".to_string(),
            email: "bea@example.com".to_string(),
            role: Role::Client,
        };
        let input = ContactInput {
            phone: "912345678".to_string(),
            ..Default::default()
        };

        let appointment = engine
            .book("svc-1", day(), 0, &input, Some(&session))
            .unwrap();

        assert_eq!(appointment.contact.name, "Beatriz");
        assert_eq!(appointment.contact.email, "bea@example.com");
        assert_eq!(appointment.contact.user_id.as_deref(), Some("USER-42"));
    }

    #[test]
    fn test_guest_books_without_email() {
        let storage = seeded(make_test_service(2));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);
        let guest = Session {
            id: "GUEST-1".to_string(),
            name: "Invitado".to_string(),
            email: String::new(),
            role: Role::Guest,
        };
        let input = ContactInput {
            name: "Carla".to_string(),
            phone: "912345678".to_string(),
            email: String::new(),
        };

        let appointment = engine.book("svc-1", day(), 0, &input, Some(&guest)).unwrap();
        assert!(appointment.contact.email.is_empty());
    }

    #[test]
    fn test_ids_are_unique_within_the_same_millisecond() {
        let storage = seeded(make_test_service(3));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);

        let first = engine.book("svc-1", day(), 0, &make_test_contact(), None).unwrap();
        let second = engine.book("svc-1", day(), 0, &make_test_contact(), None).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_complete_keeps_capacity_consumed() {
        let storage = seeded(make_test_service(2));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);

        let appointment = engine.book("svc-1", day(), 0, &make_test_contact(), None).unwrap();
        engine.complete(&appointment.id).unwrap();

        assert_eq!(capacity_at(&storage, 0), 1);
        assert!(AppointmentRepository::new(&storage).all().unwrap().is_empty());
        assert!(matches!(
            engine.complete(&appointment.id),
            Err(AgendaError::AppointmentNotFound(_))
        ));
    }

    #[test]
    fn test_cancel_skips_missing_slot() {
        let storage = seeded(make_test_service(2));
        let clock = make_test_clock();
        let engine = BookingEngine::new(&storage, &clock);
        let appointment = engine.book("svc-1", day(), 0, &make_test_contact(), None).unwrap();

        let repo = ServiceRepository::new(&storage);
        let mut service = repo.find("svc-1").unwrap().unwrap();
        service.availability.remove_date(day());
        repo.save_all(&[service]).unwrap();

        engine.cancel(&appointment.id).unwrap();
        assert!(AppointmentRepository::new(&storage).all().unwrap().is_empty());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.cl"));
        assert!(is_valid_email("first.last@mail.example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.b"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("a@b@c.d"));
        assert!(!is_valid_email("@b.cl"));
        assert!(!is_valid_email(""));
    }
}
