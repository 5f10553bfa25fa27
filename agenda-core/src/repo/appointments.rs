use crate::appointment::Appointment;
use crate::error::AgendaResult;
use crate::migrate::migrate_appointment;
use crate::storage::{APPOINTMENTS_KEY, Storage};

use super::{load_collection, save_collection};

pub struct AppointmentRepository<'a> {
    storage: &'a dyn Storage,
}

impl<'a> AppointmentRepository<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        AppointmentRepository { storage }
    }

    pub fn all(&self) -> AgendaResult<Vec<Appointment>> {
        load_collection(self.storage, APPOINTMENTS_KEY, migrate_appointment)
    }

    pub fn find(&self, id: &str) -> AgendaResult<Option<Appointment>> {
        Ok(self.all()?.into_iter().find(|a| a.id == id))
    }

    pub fn save_all(&self, appointments: &[Appointment]) -> AgendaResult<()> {
        save_collection(self.storage, APPOINTMENTS_KEY, appointments)
    }

    /// Drop every appointment.
    pub fn clear(&self) -> AgendaResult<()> {
        self.save_all(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn unreadable_records_are_skipped() {
        let storage = MemoryStorage::new().with_document(
            APPOINTMENTS_KEY,
            r#"{"schemaVersion": 2, "records": [
                {"id": "1", "servicioId": "s1", "fecha": "2030-06-12", "hora": "10:00"},
                {"id": "2", "servicioId": "s1", "fecha": "not a date", "hora": "10:00"}
            ]}"#,
        );
        let repo = AppointmentRepository::new(&storage);

        let all = repo.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "1");
        assert!(repo.find("2").unwrap().is_none());
    }

    #[test]
    fn clear_empties_collection() {
        let storage = MemoryStorage::new().with_document(
            APPOINTMENTS_KEY,
            r#"[{"id": 1, "servicioId": 1, "fecha": "2030-06-12", "hora": "10:00"}]"#,
        );
        let repo = AppointmentRepository::new(&storage);
        assert_eq!(repo.all().unwrap().len(), 1);

        repo.clear().unwrap();
        assert!(repo.all().unwrap().is_empty());
    }
}
