//! Per-service availability: calendar dates mapped to time slots, each with
//! a remaining-capacity counter.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgendaError, AgendaResult};
use crate::time::normalize_time;

/// A bookable time of day on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    /// Start time, canonical `HH:MM`
    #[serde(rename = "hora")]
    pub time: String,
    /// Remaining capacity
    #[serde(rename = "cupos")]
    pub capacity: u32,
    /// Length in minutes
    #[serde(default)]
    pub duration: u32,
}

impl Slot {
    pub fn new(time: &str, capacity: u32, duration: u32) -> Self {
        Slot {
            id: Uuid::new_v4().to_string(),
            time: normalize_time(time),
            capacity,
            duration,
        }
    }

    /// Slots are identified by their normalized start time.
    pub fn matches(&self, time: &str) -> bool {
        normalize_time(&self.time) == normalize_time(time)
    }
}

/// How a slot is picked within a date.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotLocator {
    /// Position in the date's slot list
    Index(usize),
    /// Start time, compared after normalization
    Time(String),
}

impl SlotLocator {
    pub fn time(time: &str) -> Self {
        SlotLocator::Time(time.to_string())
    }
}

impl fmt::Display for SlotLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLocator::Index(i) => write!(f, "#{}", i),
            SlotLocator::Time(t) => write!(f, "{}", normalize_time(t)),
        }
    }
}

/// Dates (ascending) mapped to their ordered slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availability(BTreeMap<NaiveDate, Vec<Slot>>);

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace (or create) the slot list for a date.
    pub fn set_slots_for_date(&mut self, date: NaiveDate, slots: Vec<Slot>) {
        self.0.insert(date, slots);
    }

    pub fn remove_date(&mut self, date: NaiveDate) -> Option<Vec<Slot>> {
        self.0.remove(&date)
    }

    /// Configured dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.0.keys().copied().collect()
    }

    /// Slots for a date. `Some(&[])` means the date exists without slots.
    pub fn slots_for(&self, date: NaiveDate) -> Option<&[Slot]> {
        self.0.get(&date).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<Slot>)> {
        self.0.iter()
    }

    pub fn slot_at(&self, date: NaiveDate, index: usize) -> Option<&Slot> {
        self.0.get(&date).and_then(|slots| slots.get(index))
    }

    pub fn find_slot(&self, date: NaiveDate, locator: &SlotLocator) -> AgendaResult<&Slot> {
        let slots = self.0.get(&date).ok_or(AgendaError::DateNotFound(date))?;
        let found = match locator {
            SlotLocator::Index(i) => slots.get(*i),
            SlotLocator::Time(t) => slots.iter().find(|s| s.matches(t)),
        };
        found.ok_or_else(|| AgendaError::SlotNotFound {
            date,
            time: locator.to_string(),
        })
    }

    fn find_slot_mut(&mut self, date: NaiveDate, locator: &SlotLocator) -> AgendaResult<&mut Slot> {
        let slots = self.0.get_mut(&date).ok_or(AgendaError::DateNotFound(date))?;
        let found = match locator {
            SlotLocator::Index(i) => slots.get_mut(*i),
            SlotLocator::Time(t) => slots.iter_mut().find(|s| s.matches(t)),
        };
        found.ok_or_else(|| AgendaError::SlotNotFound {
            date,
            time: locator.to_string(),
        })
    }

    /// Consume capacity, never going below zero. Returns the new count.
    pub fn decrement_capacity(
        &mut self,
        date: NaiveDate,
        locator: &SlotLocator,
        by: u32,
    ) -> AgendaResult<u32> {
        let slot = self.find_slot_mut(date, locator)?;
        slot.capacity = slot.capacity.saturating_sub(by);
        Ok(slot.capacity)
    }

    /// Release capacity. There is no ceiling: releasing more than was ever
    /// consumed grows the counter.
    pub fn increment_capacity(
        &mut self,
        date: NaiveDate,
        locator: &SlotLocator,
        by: u32,
    ) -> AgendaResult<u32> {
        let slot = self.find_slot_mut(date, locator)?;
        slot.capacity = slot.capacity.saturating_add(by);
        Ok(slot.capacity)
    }

    pub fn has_any_capacity(&self) -> bool {
        self.0.values().flatten().any(|s| s.capacity > 0)
    }

    /// Sum of remaining capacity, optionally only for dates on or after `from`.
    pub fn total_capacity(&self, from: Option<NaiveDate>) -> u64 {
        self.0
            .iter()
            .filter(|(date, _)| from.is_none_or(|from| **date >= from))
            .flat_map(|(_, slots)| slots)
            .map(|s| u64::from(s.capacity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> Availability {
        let mut availability = Availability::new();
        availability.set_slots_for_date(
            date(1),
            vec![Slot::new("10:00", 2, 60), Slot::new("3:00 PM", 0, 60)],
        );
        availability.set_slots_for_date(date(5), vec![Slot::new("09:30", 4, 45)]);
        availability
    }

    #[test]
    fn slots_are_stored_with_canonical_times() {
        let availability = sample();
        let slots = availability.slots_for(date(1)).unwrap();
        assert_eq!(slots[1].time, "15:00");
        assert!(slots[1].matches("3:00 pm"));
    }

    #[test]
    fn decrement_locates_by_normalized_time_and_floors_at_zero() {
        let mut availability = sample();
        let left = availability
            .decrement_capacity(date(1), &SlotLocator::time("10:00 AM"), 1)
            .unwrap();
        assert_eq!(left, 1);

        let left = availability
            .decrement_capacity(date(1), &SlotLocator::Index(0), 5)
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn decrement_reports_missing_date_and_slot() {
        let mut availability = sample();
        assert!(matches!(
            availability.decrement_capacity(date(2), &SlotLocator::time("10:00"), 1),
            Err(AgendaError::DateNotFound(_))
        ));
        assert!(matches!(
            availability.decrement_capacity(date(1), &SlotLocator::time("11:00"), 1),
            Err(AgendaError::SlotNotFound { .. })
        ));
        assert!(matches!(
            availability.decrement_capacity(date(1), &SlotLocator::Index(7), 1),
            Err(AgendaError::SlotNotFound { .. })
        ));
    }

    #[test]
    fn increment_has_no_ceiling() {
        let mut availability = sample();
        for _ in 0..3 {
            availability
                .increment_capacity(date(5), &SlotLocator::time("09:30"), 1)
                .unwrap();
        }
        assert_eq!(availability.slots_for(date(5)).unwrap()[0].capacity, 7);
    }

    #[test]
    fn capacity_queries() {
        let mut availability = sample();
        assert!(availability.has_any_capacity());
        assert_eq!(availability.total_capacity(None), 6);
        assert_eq!(availability.total_capacity(Some(date(2))), 4);

        availability.set_slots_for_date(date(1), vec![Slot::new("10:00", 0, 60)]);
        availability.set_slots_for_date(date(5), vec![]);
        assert!(!availability.has_any_capacity());
        assert_eq!(availability.dates(), vec![date(1), date(5)]);
    }

    #[test]
    fn serializes_as_date_keyed_map() {
        let mut availability = Availability::new();
        let mut slot = Slot::new("10:00", 1, 30);
        slot.id = "s1".to_string();
        availability.set_slots_for_date(date(1), vec![slot]);

        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["2024-03-01"][0]["hora"], "10:00");
        assert_eq!(json["2024-03-01"][0]["cupos"], 1);

        let back: Availability = serde_json::from_value(json).unwrap();
        assert_eq!(back, availability);
    }
}
