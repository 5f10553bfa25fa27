//! Core types and engines for agenda.
//!
//! This crate provides everything the CLI needs to run a small booking
//! desk:
//! - `Service` and `Availability` for the catalog and its bookable slots
//! - `BookingEngine`, `ReprogramEngine` and `Sanitizer` for appointment flows
//! - `Agenda`, a facade tying storage, clock and sessions together

pub mod agenda;
pub mod appointment;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod format;
mod migrate;
pub mod repo;
pub mod report;
pub mod reprogram;
pub mod sanitizer;
pub mod service;
pub mod session;
pub mod storage;
pub mod time;

pub use agenda::Agenda;
pub use appointment::{Appointment, Contact, RescheduleStatus};
pub use availability::{Availability, Slot, SlotLocator};
pub use booking::ContactInput;
pub use catalog::{ServiceDraft, TimeModule};
pub use config::AgendaConfig;
pub use error::{AgendaError, AgendaResult, ErrorKind};
pub use filter::{AppointmentFilter, ServiceFilter, StatusFilter};
pub use report::{CatalogStats, Notification, NotificationKind};
pub use sanitizer::SweepReport;
pub use service::Service;
pub use session::{RegistrationForm, Role, Session};
