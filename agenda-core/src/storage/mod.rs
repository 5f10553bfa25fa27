//! Key/value document storage.
//!
//! Every collection is one JSON document under a fixed key. Reads and writes
//! always move whole documents.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::AgendaResult;

pub const SERVICES_KEY: &str = "agendaPro_servicios";
pub const APPOINTMENTS_KEY: &str = "agendaPro_citas";
pub const SESSION_KEY: &str = "agendaPro_session";
pub const USERS_KEY: &str = "agendaPro_usuarios";

pub trait Storage {
    /// Raw document under `key`, if any.
    fn read(&self, key: &str) -> AgendaResult<Option<String>>;

    /// Replace the document under `key`.
    fn write(&self, key: &str, value: &str) -> AgendaResult<()>;

    fn remove(&self, key: &str) -> AgendaResult<()>;
}
