use std::collections::HashSet;

use serde_json::Value;

use crate::error::AgendaResult;
use crate::migrate::migrate_service;
use crate::service::Service;
use crate::storage::{SERVICES_KEY, Storage};

use super::{load_collection, load_records, save_collection_keeping_unreadable};

pub struct ServiceRepository<'a> {
    storage: &'a dyn Storage,
}

impl<'a> ServiceRepository<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        ServiceRepository { storage }
    }

    /// All services, with `dates` re-derived from their availability.
    pub fn all(&self) -> AgendaResult<Vec<Service>> {
        let mut services: Vec<Service> =
            load_collection(self.storage, SERVICES_KEY, migrate_service)?;
        for service in &mut services {
            service.sync_dates();
        }
        Ok(services)
    }

    pub fn find(&self, id: &str) -> AgendaResult<Option<Service>> {
        Ok(self.all()?.into_iter().find(|s| s.id == id))
    }

    /// Ids of every stored service record, including records that do not
    /// decode. `None` when the document itself cannot be read.
    pub fn stored_ids(&self) -> AgendaResult<Option<HashSet<String>>> {
        let Some(records) = load_records(self.storage, SERVICES_KEY, migrate_service)? else {
            return Ok(None);
        };

        let ids = records
            .iter()
            .filter_map(|record| match record.get("id") {
                Some(Value::String(id)) => Some(id.trim().to_string()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            })
            .collect();
        Ok(Some(ids))
    }

    /// Replace the catalog. Stored records that could not be decoded are
    /// kept as they are.
    pub fn save_all(&self, services: &[Service]) -> AgendaResult<()> {
        save_collection_keeping_unreadable(self.storage, SERVICES_KEY, services, migrate_service)
    }
}
