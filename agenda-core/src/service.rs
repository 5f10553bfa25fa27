//! Bookable services.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::Availability;

/// A catalog entry together with its availability calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    /// Minutes
    #[serde(rename = "duracion", default)]
    pub duration: u32,
    #[serde(rename = "imagen", default)]
    pub image: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "destacado", default)]
    pub featured: bool,
    #[serde(rename = "activo", default)]
    pub active: bool,
    #[serde(rename = "disponibilidad", default)]
    pub availability: Availability,
    /// Always the sorted keys of `availability`
    #[serde(rename = "fechas", default)]
    pub dates: Vec<NaiveDate>,
    #[serde(rename = "fechaCreacion", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaActualizacion", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Service {
    /// Recompute `dates` from the availability keys.
    pub fn sync_dates(&mut self) {
        self.dates = self.availability.dates();
    }

    /// Turn the service off once no capacity is left anywhere.
    /// Returns true if it was deactivated by this call.
    ///
    /// The reverse never happens here: reactivation is an admin action.
    pub fn deactivate_if_exhausted(&mut self) -> bool {
        if self.active && !self.availability.has_any_capacity() {
            self.active = false;
            return true;
        }
        false
    }

    pub fn offers_date(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
