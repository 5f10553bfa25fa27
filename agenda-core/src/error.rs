//! Error types for the agenda core.

use chrono::NaiveDate;
use thiserror::Error;

use crate::constants::{MIN_PHONE_DIGITS, MIN_RESCHEDULE_NOTICE_HOURS};

/// Broad classification of an [`AgendaError`], used by front ends to pick
/// how a failure is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    CapacityExhausted,
    PolicyViolation,
    Storage,
}

/// Errors that can occur in agenda operations.
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("No availability configured for {0}")]
    DateUnavailable(NaiveDate),

    #[error("Date {0} is not part of this service's availability")]
    DateNotFound(NaiveDate),

    #[error("No slot at {time} on {date}")]
    SlotNotFound { date: NaiveDate, time: String },

    #[error("Invalid slot '{slot}' for {date}")]
    SlotInvalid { date: NaiveDate, slot: String },

    #[error("Contact name is required")]
    ContactNameRequired,

    #[error("Phone number must contain at least {} digits", MIN_PHONE_DIGITS)]
    ContactPhoneInvalid,

    #[error("A valid email address is required")]
    ContactEmailInvalid,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid time module: {0}")]
    InvalidModule(String),

    #[error("An active service needs {0}")]
    ActiveServiceIncomplete(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Slot {time} on {date} is sold out")]
    SlotExhausted { date: NaiveDate, time: String },

    #[error(
        "Appointments can only be rescheduled at least {}h in advance",
        MIN_RESCHEDULE_NOTICE_HOURS
    )]
    TooLateToReprogram,

    #[error("Appointment has already passed")]
    AppointmentExpired,

    #[error("The new date and time must differ from the current ones")]
    NoChangeRequested,

    #[error("This action requires an admin session")]
    AdminRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgendaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgendaError::ServiceNotFound(_)
            | AgendaError::AppointmentNotFound(_)
            | AgendaError::DateUnavailable(_)
            | AgendaError::DateNotFound(_)
            | AgendaError::SlotNotFound { .. }
            | AgendaError::SlotInvalid { .. } => ErrorKind::NotFound,

            AgendaError::ContactNameRequired
            | AgendaError::ContactPhoneInvalid
            | AgendaError::ContactEmailInvalid
            | AgendaError::MissingField(_)
            | AgendaError::InvalidModule(_)
            | AgendaError::ActiveServiceIncomplete(_)
            | AgendaError::PasswordMismatch
            | AgendaError::EmailAlreadyRegistered(_)
            | AgendaError::InvalidCredentials => ErrorKind::Validation,

            AgendaError::SlotExhausted { .. } => ErrorKind::CapacityExhausted,

            AgendaError::TooLateToReprogram
            | AgendaError::AppointmentExpired
            | AgendaError::NoChangeRequested
            | AgendaError::AdminRequired => ErrorKind::PolicyViolation,

            AgendaError::Config(_) | AgendaError::Io(_) | AgendaError::Serialization(_) => {
                ErrorKind::Storage
            }
        }
    }
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
