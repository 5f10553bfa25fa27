//! The agenda facade: one entry point over storage, clock and the engines.

use chrono::NaiveDate;

use crate::appointment::{Appointment, RescheduleStatus};
use crate::booking::{BookingEngine, ContactInput};
use crate::catalog::{Catalog, ServiceDraft};
use crate::clock::{Clock, SystemClock};
use crate::config::AgendaConfig;
use crate::error::{AgendaError, AgendaResult};
use crate::filter::{AppointmentFilter, ServiceFilter};
use crate::repo::{AppointmentRepository, ServiceRepository};
use crate::report::{self, CatalogStats, Notification};
use crate::reprogram::ReprogramEngine;
use crate::sanitizer::{Sanitizer, SweepReport};
use crate::service::Service;
use crate::session::{RegistrationForm, Session, SessionManager};
use crate::storage::{FileStorage, Storage};

pub struct Agenda {
    config: AgendaConfig,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
}

impl Agenda {
    /// Load the global config and open file storage in its data directory.
    pub fn open() -> AgendaResult<Self> {
        let config = AgendaConfig::load()?;
        let storage = FileStorage::new(config.data_path());
        Ok(Self::new(config, Box::new(storage), Box::new(SystemClock)))
    }

    pub fn new(config: AgendaConfig, storage: Box<dyn Storage>, clock: Box<dyn Clock>) -> Self {
        Agenda {
            config,
            storage,
            clock,
        }
    }

    pub fn config(&self) -> &AgendaConfig {
        &self.config
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Local> {
        self.clock.now()
    }

    fn sessions(&self) -> SessionManager<'_> {
        SessionManager::new(self.storage.as_ref(), self.clock.as_ref())
    }

    fn services(&self) -> ServiceRepository<'_> {
        ServiceRepository::new(self.storage.as_ref())
    }

    fn appointments(&self) -> AppointmentRepository<'_> {
        AppointmentRepository::new(self.storage.as_ref())
    }

    fn booking(&self) -> BookingEngine<'_> {
        BookingEngine::new(self.storage.as_ref(), self.clock.as_ref())
    }

    fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self.storage.as_ref(), self.clock.as_ref())
    }

    fn sanitizer(&self) -> Sanitizer<'_> {
        Sanitizer::new(self.storage.as_ref(), self.clock.as_ref())
    }

    // Sessions

    pub fn session(&self) -> AgendaResult<Option<Session>> {
        self.sessions().current()
    }

    /// The current session, if it is an admin one.
    pub fn require_admin(&self) -> AgendaResult<Session> {
        match self.session()? {
            Some(session) if session.is_admin() => Ok(session),
            _ => Err(AgendaError::AdminRequired),
        }
    }

    pub fn register(&self, form: &RegistrationForm) -> AgendaResult<Session> {
        self.sessions().register(form)
    }

    pub fn login_admin(&self, password: &str) -> AgendaResult<Session> {
        self.sessions()
            .login_admin(password, &self.config.admin_password)
    }

    pub fn login_with_token(&self, token: &str) -> AgendaResult<Session> {
        self.sessions().login_with_token(token)
    }

    pub fn login_guest(&self) -> AgendaResult<Session> {
        self.sessions().login_guest()
    }

    pub fn logout(&self) -> AgendaResult<()> {
        self.sessions().logout()
    }

    // Catalog

    pub fn list_services(&self, filter: &ServiceFilter) -> AgendaResult<Vec<Service>> {
        let services = self.services().all()?;
        Ok(filter.apply(&services).into_iter().cloned().collect())
    }

    pub fn get_service(&self, id: &str) -> AgendaResult<Service> {
        self.services()
            .find(id)?
            .ok_or_else(|| AgendaError::ServiceNotFound(id.to_string()))
    }

    pub fn create_service(&self, draft: ServiceDraft) -> AgendaResult<Service> {
        self.catalog().create(draft)
    }

    pub fn update_service(&self, id: &str, draft: ServiceDraft) -> AgendaResult<Service> {
        self.catalog().update(id, draft)
    }

    pub fn delete_service(&self, id: &str) -> AgendaResult<Service> {
        self.catalog().delete(id)
    }

    pub fn toggle_service_active(&self, id: &str) -> AgendaResult<Service> {
        self.catalog().toggle_active(id)
    }

    pub fn seed_demo_services(&self) -> AgendaResult<Option<Vec<Service>>> {
        self.catalog().seed_demo()
    }

    pub fn stats(&self) -> AgendaResult<CatalogStats> {
        Ok(report::catalog_stats(&self.services().all()?))
    }

    // Appointments

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> AgendaResult<Vec<Appointment>> {
        Ok(self
            .appointments()
            .all()?
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect())
    }

    pub fn get_appointment(&self, id: &str) -> AgendaResult<Appointment> {
        self.appointments()
            .find(id)?
            .ok_or_else(|| AgendaError::AppointmentNotFound(id.to_string()))
    }

    /// Appointments of the current session; empty when signed out.
    pub fn my_appointments(&self) -> AgendaResult<Vec<Appointment>> {
        match self.session()? {
            Some(session) => self.list_appointments(&AppointmentFilter::owned_by(session)),
            None => Ok(Vec::new()),
        }
    }

    /// Book on behalf of the current session (if any).
    pub fn book(
        &self,
        service_id: &str,
        date: NaiveDate,
        slot_index: usize,
        contact: &ContactInput,
    ) -> AgendaResult<Appointment> {
        let session = self.session()?;
        self.booking()
            .book(service_id, date, slot_index, contact, session.as_ref())
    }

    /// Move an appointment within its own service.
    pub fn reprogram(
        &self,
        appointment_id: &str,
        new_date: NaiveDate,
        new_time: &str,
    ) -> AgendaResult<Appointment> {
        let appointment = self.get_appointment(appointment_id)?;
        ReprogramEngine::new(self.storage.as_ref(), self.clock.as_ref()).reprogram(
            appointment_id,
            &appointment.service_id,
            new_date,
            new_time,
        )
    }

    pub fn cancel_appointment(&self, appointment_id: &str) -> AgendaResult<Appointment> {
        self.booking().cancel(appointment_id)
    }

    pub fn complete_appointment(&self, appointment_id: &str) -> AgendaResult<Appointment> {
        self.booking().complete(appointment_id)
    }

    pub fn reschedule_status(&self, appointment_id: &str) -> AgendaResult<RescheduleStatus> {
        Ok(self
            .get_appointment(appointment_id)?
            .reschedule_status(self.clock.now()))
    }

    pub fn clear_appointments(&self) -> AgendaResult<usize> {
        let repo = self.appointments();
        let count = repo.all()?.len();
        repo.clear()?;
        tracing::info!(count, "cleared all appointments");
        Ok(count)
    }

    pub fn projected_revenue(&self) -> AgendaResult<f64> {
        Ok(report::projected_revenue(&self.appointments().all()?))
    }

    pub fn notifications(&self) -> AgendaResult<Vec<Notification>> {
        Ok(report::notifications(
            &self.appointments().all()?,
            self.clock.now(),
        ))
    }

    // Maintenance

    pub fn sweep(&self) -> AgendaResult<SweepReport> {
        self.sanitizer().sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;

    fn make_test_agenda() -> Agenda {
        let clock = FixedClock::at(
            NaiveDate::from_ymd_opt(2030, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        Agenda::new(
            AgendaConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(clock),
        )
    }

    fn contact() -> ContactInput {
        ContactInput {
            name: String::new(),
            phone: "9 8765 4321".to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn test_admin_gate() {
        let agenda = make_test_agenda();
        assert!(matches!(agenda.require_admin(), Err(AgendaError::AdminRequired)));

        agenda.login_guest().unwrap();
        assert!(matches!(agenda.require_admin(), Err(AgendaError::AdminRequired)));

        agenda.login_admin("admin123").unwrap();
        assert!(agenda.require_admin().unwrap().is_admin());
    }

    #[test]
    fn test_booking_flow_through_facade() {
        let agenda = make_test_agenda();
        let demo = agenda.seed_demo_services().unwrap().unwrap();
        let massage = &demo[0];
        let date = massage.dates[0];

        agenda
            .register(&RegistrationForm {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: "pw".to_string(),
                confirm_password: "pw".to_string(),
            })
            .unwrap();

        let booked = agenda.book(&massage.id, date, 0, &contact()).unwrap();
        assert_eq!(booked.contact.email, "ana@example.com");
        assert_eq!(agenda.my_appointments().unwrap().len(), 1);
        assert_eq!(
            agenda.reschedule_status(&booked.id).unwrap(),
            RescheduleStatus::Allowed
        );

        let moved = agenda.reprogram(&booked.id, date, "15:00").unwrap();
        assert!(moved.edited);
        assert_eq!(agenda.projected_revenue().unwrap(), 60.0);

        let notes = agenda.notifications().unwrap();
        assert_eq!(notes.len(), 1);

        agenda.logout().unwrap();
        assert!(agenda.my_appointments().unwrap().is_empty());
        assert_eq!(agenda.list_appointments(&AppointmentFilter::default()).unwrap().len(), 1);

        assert_eq!(agenda.clear_appointments().unwrap(), 1);
        assert_eq!(agenda.sweep().unwrap(), SweepReport::default());
    }

    #[test]
    fn test_stats_and_filters() {
        let agenda = make_test_agenda();
        agenda.seed_demo_services().unwrap();

        let stats = agenda.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.featured, 2);

        agenda.toggle_service_active("3").unwrap();
        assert_eq!(agenda.list_services(&ServiceFilter::client()).unwrap().len(), 2);
        assert!(matches!(
            agenda.get_service("99"),
            Err(AgendaError::ServiceNotFound(_))
        ));
    }
}
