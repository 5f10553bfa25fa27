use tracing::warn;

use crate::error::{AgendaError, AgendaResult};
use crate::migrate::migrate_user;
use crate::session::{Session, User};
use crate::storage::{SESSION_KEY, Storage, USERS_KEY};

use super::{load_collection, save_collection};

/// The single current session document.
pub struct SessionRepository<'a> {
    storage: &'a dyn Storage,
}

impl<'a> SessionRepository<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        SessionRepository { storage }
    }

    /// An unreadable session is treated as signed out.
    pub fn current(&self) -> AgendaResult<Option<Session>> {
        let Some(raw) = self.storage.read(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session");
                Ok(None)
            }
        }
    }

    pub fn set(&self, session: &Session) -> AgendaResult<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| AgendaError::Serialization(e.to_string()))?;
        self.storage.write(SESSION_KEY, &json)
    }

    pub fn clear(&self) -> AgendaResult<()> {
        self.storage.remove(SESSION_KEY)
    }
}

pub struct UserRepository<'a> {
    storage: &'a dyn Storage,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        UserRepository { storage }
    }

    pub fn all(&self) -> AgendaResult<Vec<User>> {
        load_collection(self.storage, USERS_KEY, migrate_user)
    }

    pub fn save_all(&self, users: &[User]) -> AgendaResult<()> {
        save_collection(self.storage, USERS_KEY, users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn garbage_session_is_signed_out() {
        let storage = MemoryStorage::new().with_document(SESSION_KEY, "[1, 2");
        assert_eq!(SessionRepository::new(&storage).current().unwrap(), None);
    }

    #[test]
    fn legacy_session_without_email_loads() {
        let storage = MemoryStorage::new().with_document(
            SESSION_KEY,
            r#"{"id": "GUEST-1", "nombre": "Invitado", "rol": "invitado"}"#,
        );
        let session = SessionRepository::new(&storage).current().unwrap().unwrap();
        assert!(session.is_guest());
        assert!(session.email.is_empty());
    }
}
