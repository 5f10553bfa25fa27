//! Current identity, registered users, and the flows that switch between them.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{AgendaError, AgendaResult};
use crate::repo::{SessionRepository, UserRepository};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "cliente")]
    Client,
    #[serde(rename = "invitado")]
    Guest,
}

/// The identity currently using the agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Guests are recognized by role, or by a guest-style display name on
    /// sessions created before roles were recorded.
    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest || self.name.to_lowercase().contains("invit")
    }

    /// Guests can book without an email address.
    pub fn requires_email(&self) -> bool {
        !self.is_guest()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct SessionManager<'a> {
    storage: &'a dyn Storage,
    clock: &'a dyn Clock,
}

impl<'a> SessionManager<'a> {
    pub fn new(storage: &'a dyn Storage, clock: &'a dyn Clock) -> Self {
        SessionManager { storage, clock }
    }

    pub fn current(&self) -> AgendaResult<Option<Session>> {
        SessionRepository::new(self.storage).current()
    }

    /// Create a client account and sign it in.
    pub fn register(&self, form: &RegistrationForm) -> AgendaResult<Session> {
        let name = form.name.trim();
        let email = form.email.trim().to_lowercase();

        if name.is_empty() {
            return Err(AgendaError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(AgendaError::MissingField("email"));
        }
        if form.password.is_empty() {
            return Err(AgendaError::MissingField("password"));
        }
        if form.password != form.confirm_password {
            return Err(AgendaError::PasswordMismatch);
        }

        let users = UserRepository::new(self.storage);
        let mut all = users.all()?;
        if all.iter().any(|u| u.email == email) {
            return Err(AgendaError::EmailAlreadyRegistered(email));
        }

        let user = User {
            id: self.stamped_id("USER"),
            name: name.to_string(),
            email,
            password: form.password.clone(),
            role: Role::Client,
        };
        all.push(user.clone());
        users.save_all(&all)?;

        info!(user = %user.id, "registered new client account");

        self.start(Session {
            id: user.id,
            name: user.name,
            email: user.email,
            role: Role::Client,
        })
    }

    pub fn login_admin(&self, password: &str, expected: &str) -> AgendaResult<Session> {
        if password != expected {
            return Err(AgendaError::InvalidCredentials);
        }
        self.start(Session {
            id: self.stamped_id("ADMIN"),
            name: "Administrador".to_string(),
            email: "admin@local".to_string(),
            role: Role::Admin,
        })
    }

    /// Quick access: tokens mentioning `ADMIN` open an admin session,
    /// anything else a client one.
    pub fn login_with_token(&self, token: &str) -> AgendaResult<Session> {
        let is_admin = token.trim().to_uppercase().contains("ADMIN");
        let session = if is_admin {
            Session {
                id: self.stamped_id("ADMIN"),
                name: "Usuario Invitado".to_string(),
                email: "admin@invitado.local".to_string(),
                role: Role::Admin,
            }
        } else {
            Session {
                id: self.stamped_id("USER"),
                name: "Usuario Invitado".to_string(),
                email: String::new(),
                role: Role::Client,
            }
        };
        self.start(session)
    }

    pub fn login_guest(&self) -> AgendaResult<Session> {
        self.start(Session {
            id: self.stamped_id("GUEST"),
            name: "Invitado".to_string(),
            email: String::new(),
            role: Role::Guest,
        })
    }

    pub fn logout(&self) -> AgendaResult<()> {
        SessionRepository::new(self.storage).clear()
    }

    fn start(&self, session: Session) -> AgendaResult<Session> {
        SessionRepository::new(self.storage).set(&session)?;
        info!(session = %session.id, role = ?session.role, "session started");
        Ok(session)
    }

    fn stamped_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.clock.now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::at(
            NaiveDate::from_ymd_opt(2030, 6, 10)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        )
    }

    fn form(email: &str) -> RegistrationForm {
        RegistrationForm {
            name: " Ana Pérez ".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        }
    }

    #[test]
    fn register_signs_in_new_client() {
        let storage = MemoryStorage::new();
        let clock = clock();
        let sessions = SessionManager::new(&storage, &clock);

        let session = sessions.register(&form("Ana@Example.com ")).unwrap();
        assert_eq!(session.name, "Ana Pérez");
        assert_eq!(session.email, "ana@example.com");
        assert_eq!(session.role, Role::Client);
        assert!(session.id.starts_with("USER-"));
        assert_eq!(sessions.current().unwrap(), Some(session));
    }

    #[test]
    fn register_rejects_duplicates_and_mismatches() {
        let storage = MemoryStorage::new();
        let clock = clock();
        let sessions = SessionManager::new(&storage, &clock);

        sessions.register(&form("ana@example.com")).unwrap();
        assert!(matches!(
            sessions.register(&form("ANA@example.com")),
            Err(AgendaError::EmailAlreadyRegistered(_))
        ));

        let mut mismatch = form("other@example.com");
        mismatch.confirm_password = "nope".to_string();
        assert!(matches!(
            sessions.register(&mismatch),
            Err(AgendaError::PasswordMismatch)
        ));
    }

    #[test]
    fn admin_login_checks_password() {
        let storage = MemoryStorage::new();
        let clock = clock();
        let sessions = SessionManager::new(&storage, &clock);

        assert!(matches!(
            sessions.login_admin("wrong", "admin123"),
            Err(AgendaError::InvalidCredentials)
        ));
        assert_eq!(sessions.current().unwrap(), None);

        let session = sessions.login_admin("admin123", "admin123").unwrap();
        assert!(session.is_admin());
    }

    #[test]
    fn token_and_guest_access() {
        let storage = MemoryStorage::new();
        let clock = clock();
        let sessions = SessionManager::new(&storage, &clock);

        assert!(sessions.login_with_token("vip-admin-01").unwrap().is_admin());
        assert_eq!(
            sessions.login_with_token("hello").unwrap().role,
            Role::Client
        );

        let guest = sessions.login_guest().unwrap();
        assert!(guest.is_guest());
        assert!(!guest.requires_email());

        sessions.logout().unwrap();
        assert_eq!(sessions.current().unwrap(), None);
    }
}
