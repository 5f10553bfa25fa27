//! Typed access to the persisted collections.
//!
//! Reads are fail-soft: a missing or corrupt document is an empty
//! collection, and a record that does not decode is skipped. Writes always
//! produce a current-version document. Service writes keep the records
//! that could not be decoded.

mod appointments;
mod services;
mod sessions;

pub use appointments::AppointmentRepository;
pub use services::ServiceRepository;
pub use sessions::{SessionRepository, UserRepository};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::SCHEMA_VERSION;
use crate::error::{AgendaError, AgendaResult};
use crate::migrate::{RecordMigration, upgrade_collection};
use crate::storage::Storage;

#[derive(Serialize)]
struct CollectionDocument<'a, T> {
    #[serde(rename = "schemaVersion")]
    schema_version: u32,
    records: &'a [T],
}

/// Migrated raw records of a collection. A missing document is an empty
/// collection; `None` means the document exists but cannot be read.
pub(crate) fn load_records(
    storage: &dyn Storage,
    key: &str,
    migrate: RecordMigration,
) -> AgendaResult<Option<Vec<Value>>> {
    let Some(raw) = storage.read(key)? else {
        return Ok(Some(Vec::new()));
    };

    match serde_json::from_str(&raw) {
        Ok(document) => Ok(upgrade_collection(document, migrate)),
        Err(e) => {
            warn!(key, error = %e, "corrupt collection document");
            Ok(None)
        }
    }
}

pub(crate) fn load_collection<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    migrate: RecordMigration,
) -> AgendaResult<Vec<T>> {
    let records = load_records(storage, key, migrate)?
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, index = i, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect();

    Ok(records)
}

pub(crate) fn save_collection<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    records: &[T],
) -> AgendaResult<()> {
    let document = CollectionDocument {
        schema_version: SCHEMA_VERSION,
        records,
    };
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| AgendaError::Serialization(e.to_string()))?;
    storage.write(key, &json)
}

/// Save `records` and carry over any stored record that does not decode as
/// `T`, so a typed rewrite never loses data it could not read.
pub(crate) fn save_collection_keeping_unreadable<T: Serialize + DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    records: &[T],
    migrate: RecordMigration,
) -> AgendaResult<()> {
    let unreadable: Vec<Value> = load_records(storage, key, migrate)?
        .unwrap_or_default()
        .into_iter()
        .filter(|record| serde_json::from_value::<T>(record.clone()).is_err())
        .collect();

    if unreadable.is_empty() {
        return save_collection(storage, key, records);
    }

    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .map_err(|e| AgendaError::Serialization(e.to_string()))?;
    debug!(key, kept = unreadable.len(), "keeping unreadable records");
    values.extend(unreadable);

    save_collection(storage, key, &values)
}
