//! The signed-in user and the storage it survives restarts in.
//!
//! The user record is kept as JSON under a single key, the same shape a
//! browser would keep in local storage. What backs that key is a
//! [`SessionStore`]: in memory by default, SQLite once a workspace is open.

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::auth;
use crate::db;
use crate::error::{PortalResult, AUTH_PATH};
use crate::model::User;

pub const SESSION_KEY: &str = "edutrack_user";

pub trait SessionStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SessionStore for SqliteStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        db::kv_get(&self.conn, key)
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        db::kv_set(&self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        db::kv_remove(&self.conn, key)
    }
}

pub struct Session {
    store: Box<dyn SessionStore>,
    user: Option<User>,
}

impl Session {
    /// Loads the stored user. Unreadable or malformed state means "signed out".
    pub fn restore(store: Box<dyn SessionStore>) -> Self {
        let user = read_stored_user(store.as_ref());
        if let Some(u) = &user {
            info!(user_id = %u.id, role = %u.role, "restored session");
        }
        Self { store, user }
    }

    pub fn in_memory() -> Self {
        Self::restore(Box::new(MemoryStore::default()))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns the signed-in user and the page to open next.
    pub fn login(&mut self, email: &str, password: &str) -> PortalResult<(User, &'static str)> {
        let user = auth::authenticate(email, password)?;
        let encoded = serde_json::to_string(&user).map_err(anyhow::Error::from)?;
        self.store.write(SESSION_KEY, &encoded)?;
        info!(user_id = %user.id, role = %user.role, "signed in");
        let landing = auth::landing_path(user.role);
        self.user = Some(user.clone());
        Ok((user, landing))
    }

    pub fn logout(&mut self) -> PortalResult<&'static str> {
        self.store.remove(SESSION_KEY)?;
        if let Some(u) = self.user.take() {
            info!(user_id = %u.id, "signed out");
        }
        Ok(AUTH_PATH)
    }

    /// Re-reads the stored user; a record with an id yields its landing page.
    pub fn check(&mut self) -> Option<&'static str> {
        let stored = read_stored_user(self.store.as_ref()).filter(|u| !u.id.is_empty());
        let landing = stored.as_ref().map(|u| auth::landing_path(u.role));
        self.user = stored;
        landing
    }
}

fn read_stored_user(store: &dyn SessionStore) -> Option<User> {
    let raw = match store.read(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "failed to read stored user");
            return None;
        }
    };
    match serde_json::from_str::<User>(&raw) {
        Ok(u) => Some(u),
        Err(e) => {
            warn!(error = %e, "failed to parse stored user");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(raw: &str) -> Box<dyn SessionStore> {
        let mut store = MemoryStore::default();
        store.write(SESSION_KEY, raw).expect("write");
        Box::new(store)
    }

    #[test]
    fn login_writes_key_and_logout_clears_it() {
        let mut session = Session::in_memory();
        assert!(!session.is_authenticated());

        let (user, landing) = session.login("admin@demo.com", "demo123").expect("login");
        assert_eq!(landing, "/admin/dashboard");
        assert_eq!(session.user(), Some(&user));
        assert_eq!(session.check(), Some("/admin/dashboard"));

        assert_eq!(session.logout().expect("logout"), "/auth");
        assert!(!session.is_authenticated());
        assert_eq!(session.check(), None);
    }

    #[test]
    fn failed_login_keeps_previous_state() {
        let mut session = Session::in_memory();
        session.login("student@demo.com", "demo123").expect("login");
        assert!(session.login("student@demo.com", "nope").is_err());
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("student@demo.com"));
    }

    #[test]
    fn corrupt_stored_value_restores_signed_out() {
        let session = Session::restore(store_with("{not json"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn stored_user_restores() {
        let session = Session::restore(store_with(
            r#"{"id":"2","email":"teacher@demo.com","name":"Demo Teacher","role":"teacher"}"#,
        ));
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Demo Teacher"));
    }

    #[test]
    fn check_ignores_records_without_id() {
        let mut session = Session::restore(store_with(
            r#"{"id":"","email":"x@demo.com","name":"X","role":"student"}"#,
        ));
        assert_eq!(session.check(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn sqlite_store_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let conn = db::open_db(dir.path()).expect("open");
            let mut session = Session::restore(Box::new(SqliteStore::new(conn)));
            session.login("teacher@demo.com", "demo123").expect("login");
        }
        let conn = db::open_db(dir.path()).expect("reopen");
        let session = Session::restore(Box::new(SqliteStore::new(conn)));
        assert_eq!(session.user().map(|u| u.id.as_str()), Some("2"));
    }
}
