//! Load-time schema migration.
//!
//! Collections are persisted as `{"schemaVersion": N, "records": [...]}`.
//! Older data is a bare JSON array (version 1) whose records may use legacy
//! field names: `startTime` for a slot's `hora`, `capacidad` for `cupos`,
//! numeric ids, contact fields at the top level, and so on. Every record is
//! brought to the current shape here, once, so the typed model never has to
//! branch on field presence.

use serde_json::{Map, Number, Value};
use tracing::warn;
use uuid::Uuid;

use crate::constants::{DEFAULT_SERVICE_DURATION, SCHEMA_VERSION};
use crate::time::{format_date, normalize_time, parse_date};

pub(crate) type RecordMigration = fn(&mut Map<String, Value>);

/// Extract the records of a collection document, migrating them if the
/// document predates the current schema. Non-object records are dropped.
/// `None` means the document is not a collection at all.
pub(crate) fn upgrade_collection(document: Value, migrate: RecordMigration) -> Option<Vec<Value>> {
    let (version, records) = match document {
        Value::Array(records) => (1, records),
        Value::Object(mut obj) => {
            let version = obj
                .get("schemaVersion")
                .and_then(Value::as_u64)
                .unwrap_or(1);
            match obj.remove("records") {
                Some(Value::Array(records)) => (version, records),
                _ => {
                    warn!("collection document has no records array");
                    return None;
                }
            }
        }
        Value::Null => return Some(Vec::new()),
        _ => {
            warn!("unexpected collection document shape");
            return None;
        }
    };

    let needs_migration = version < u64::from(SCHEMA_VERSION);

    let records = records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(mut obj) => {
                if needs_migration {
                    migrate(&mut obj);
                }
                Some(Value::Object(obj))
            }
            _ => None,
        })
        .collect();

    Some(records)
}

pub(crate) fn migrate_service(obj: &mut Map<String, Value>) {
    stringify_id(obj, "id");
    coerce_number(obj, "precio", 0.0);

    if !obj.get("duracion").is_some_and(Value::is_u64) {
        let duration = obj
            .get("duracion")
            .and_then(as_f64)
            .filter(|d| *d >= 0.0)
            .map(|d| d as u64)
            .unwrap_or(u64::from(DEFAULT_SERVICE_DURATION));
        obj.insert("duracion".into(), Value::from(duration));
    }

    let availability = match obj.remove("disponibilidad") {
        Some(Value::Object(days)) => migrate_availability(days),
        _ => Map::new(),
    };

    // `fechas` mirrors the availability keys, which a map keeps sorted
    let dates: Vec<Value> = availability.keys().cloned().map(Value::String).collect();
    let has_capacity = availability
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .any(|slot| slot.get("cupos").and_then(Value::as_u64).unwrap_or(0) > 0);

    obj.insert("disponibilidad".into(), Value::Object(availability));
    obj.insert("fechas".into(), Value::Array(dates));

    if obj.get("activo").and_then(Value::as_bool).unwrap_or(false) && !has_capacity {
        let id = obj.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        warn!(service = %id, "active service has no bookable capacity, deactivating");
        obj.insert("activo".into(), Value::Bool(false));
    }

    obj.remove("capacidad");
    drop_invalid_timestamp(obj, "fechaCreacion");
    drop_invalid_timestamp(obj, "fechaActualizacion");
}

fn migrate_availability(days: Map<String, Value>) -> Map<String, Value> {
    let mut migrated = Map::new();

    for (key, slots) in days {
        let Some(date) = parse_date(&key) else {
            warn!(date = %key, "dropping availability for unreadable date");
            continue;
        };

        let slots: Vec<Value> = match slots {
            Value::Array(slots) => slots
                .into_iter()
                .filter_map(|slot| match slot {
                    Value::Object(mut slot) => {
                        migrate_slot(&mut slot);
                        Some(Value::Object(slot))
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        migrated.insert(format_date(date), Value::Array(slots));
    }

    migrated
}

fn migrate_slot(slot: &mut Map<String, Value>) {
    match slot.get("id") {
        Some(Value::String(_)) => {}
        Some(Value::Number(n)) => {
            let id = n.to_string();
            slot.insert("id".into(), Value::String(id));
        }
        _ => {
            slot.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
    }

    let time = first_string(slot, &["hora", "startTime"])
        .map(|t| normalize_time(&t))
        .unwrap_or_else(|| "00:00".to_string());
    slot.insert("hora".into(), Value::String(time));
    slot.remove("startTime");

    let capacity = ["cupos", "capacidad", "capacity", "cupo"]
        .iter()
        .find_map(|k| slot.get(*k).and_then(as_f64))
        .map(|c| c.max(0.0).floor() as u64)
        .unwrap_or(0);
    for legacy in ["capacidad", "capacity", "cupo"] {
        slot.remove(legacy);
    }
    slot.insert("cupos".into(), Value::from(capacity));

    let duration = ["duration", "duracion"]
        .iter()
        .find_map(|k| slot.get(*k).and_then(as_f64))
        .map(|d| d.max(0.0) as u64)
        .unwrap_or(0);
    slot.remove("duracion");
    slot.insert("duration".into(), Value::from(duration));
}

pub(crate) fn migrate_appointment(obj: &mut Map<String, Value>) {
    stringify_id(obj, "id");
    stringify_id(obj, "servicioId");

    if let Some(name) = first_string(obj, &["nombre", "servicioNombre"]) {
        obj.insert("nombre".into(), Value::String(name));
    }

    let price = ["precio", "price", "amount", "valor", "total", "servicioPrecio", "costo"]
        .iter()
        .find_map(|k| {
            obj.get(*k)
                .and_then(as_f64)
                .or_else(|| obj.get("servicio").and_then(|s| s.get(*k)).and_then(as_f64))
        })
        .unwrap_or(0.0);
    obj.insert("precio".into(), number(price));

    let mut contact = match obj.remove("contacto") {
        Some(Value::Object(c)) => c,
        _ => Map::new(),
    };
    if !contact.get("nombre").is_some_and(Value::is_string) {
        let name = first_string(obj, &["nombreCliente"]).unwrap_or_default();
        contact.insert("nombre".into(), Value::String(name));
    }
    if !contact.get("telefono").is_some_and(Value::is_string) {
        let phone = first_string(obj, &["telefonoCliente", "telefono"]).unwrap_or_default();
        contact.insert("telefono".into(), Value::String(phone));
    }
    if !contact.get("email").is_some_and(Value::is_string) {
        let email = first_string(obj, &["email", "emailCliente"]).unwrap_or_default();
        contact.insert("email".into(), Value::String(email));
    }
    match contact.get("userId") {
        Some(Value::Number(n)) => {
            let id = n.to_string();
            contact.insert("userId".into(), Value::String(id));
        }
        Some(Value::String(_)) | Some(Value::Null) => {}
        _ => {
            contact.insert("userId".into(), Value::Null);
        }
    }
    obj.insert("contacto".into(), Value::Object(contact));

    if !obj.contains_key("creadoEn") {
        if let Some(created) = obj.remove("fechaCreacion") {
            obj.insert("creadoEn".into(), created);
        }
    }
    drop_invalid_timestamp(obj, "creadoEn");
    drop_invalid_timestamp(obj, "fechaEdicion");

    if let Some(date) = obj.get("fecha").and_then(Value::as_str).and_then(parse_date) {
        obj.insert("fecha".into(), Value::String(format_date(date)));
    }

    match obj.get("hora") {
        Some(Value::String(_)) => {}
        Some(Value::Number(n)) => {
            let time = n.to_string();
            obj.insert("hora".into(), Value::String(time));
        }
        _ => {
            obj.insert("hora".into(), Value::String(String::new()));
        }
    }

    for legacy in [
        "servicioNombre",
        "nombreCliente",
        "telefonoCliente",
        "telefono",
        "emailCliente",
        "price",
        "amount",
        "valor",
        "total",
        "servicioPrecio",
        "costo",
        "moduloIndex",
    ] {
        obj.remove(legacy);
    }
}

pub(crate) fn migrate_user(obj: &mut Map<String, Value>) {
    stringify_id(obj, "id");
    if !obj.get("rol").is_some_and(Value::is_string) {
        obj.insert("rol".into(), Value::String("cliente".into()));
    }
}

/// Numbers become strings; null or missing ids become empty strings.
fn stringify_id(obj: &mut Map<String, Value>, key: &str) {
    let id = match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    obj.insert(key.into(), Value::String(id));
}

fn coerce_number(obj: &mut Map<String, Value>, key: &str, default: f64) {
    let value = obj.get(key).and_then(as_f64).unwrap_or(default);
    obj.insert(key.into(), number(value));
}

/// Numbers, or strings holding a number.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::from(0), Value::Number)
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn drop_invalid_timestamp(obj: &mut Map<String, Value>, key: &str) {
    let valid = match obj.get(key) {
        None => return,
        Some(Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
        Some(_) => false,
    };
    if !valid {
        obj.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_migrated() {
        let doc = json!([
            { "id": 17, "servicioId": 3, "fecha": "2024-3-1", "hora": "10:00",
              "nombreCliente": "Ana", "telefonoCliente": "91234567", "price": "45" },
            null,
            "garbage"
        ]);

        let records = upgrade_collection(doc, migrate_appointment).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record["id"], "17");
        assert_eq!(record["servicioId"], "3");
        assert_eq!(record["fecha"], "2024-03-01");
        assert_eq!(record["precio"], 45.0);
        assert_eq!(record["contacto"]["nombre"], "Ana");
        assert_eq!(record["contacto"]["telefono"], "91234567");
        assert!(record.get("nombreCliente").is_none());
    }

    #[test]
    fn current_documents_are_left_alone() {
        let doc = json!({
            "schemaVersion": SCHEMA_VERSION,
            "records": [{ "id": 5, "servicioId": "1" }]
        });
        let records = upgrade_collection(doc, migrate_appointment).unwrap();
        assert_eq!(records[0]["id"], 5);
    }

    #[test]
    fn legacy_slots_are_normalized() {
        let doc = json!([{
            "id": 1700000000000u64,
            "nombre": "Masaje",
            "precio": "60",
            "activo": true,
            "disponibilidad": {
                "2024-03-01": [
                    { "id": 1.5, "startTime": "10:00 AM", "capacidad": 3 },
                    { "hora": "3:30 pm", "cupos": -2 }
                ],
                "someday": [{ "hora": "12:00", "cupos": 1 }]
            }
        }]);

        let records = upgrade_collection(doc, migrate_service).unwrap();
        let service = &records[0];

        assert_eq!(service["id"], "1700000000000");
        assert_eq!(service["precio"], 60.0);
        assert_eq!(service["duracion"], 60);
        assert_eq!(service["fechas"], json!(["2024-03-01"]));

        let slots = service["disponibilidad"]["2024-03-01"].as_array().unwrap();
        assert_eq!(slots[0]["hora"], "10:00");
        assert_eq!(slots[0]["cupos"], 3);
        assert_eq!(slots[0]["id"], "1.5");
        assert_eq!(slots[1]["hora"], "15:30");
        assert_eq!(slots[1]["cupos"], 0);
        assert!(slots[1]["id"].is_string());
        assert_eq!(service["activo"], true);
    }

    #[test]
    fn active_service_without_capacity_is_deactivated() {
        let doc = json!([{ "id": 2, "nombre": "Corte", "activo": true, "capacidad": 6,
                           "fechas": ["2024-02-14"] }]);
        let records = upgrade_collection(doc, migrate_service).unwrap();
        assert_eq!(records[0]["activo"], false);
        assert_eq!(records[0]["fechas"], json!([]));
        assert!(records[0].get("capacidad").is_none());
    }
}
