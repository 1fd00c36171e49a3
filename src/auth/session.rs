use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Role, UserProfile};

/// Fixed key the session record is stored under.
/// The browser build keeps the same record in localStorage under this name.
pub const STORAGE_KEY: &str = "userData";

/// The authenticated user's credential plus profile/permission snapshot.
///
/// A token being present is what makes the console consider itself
/// authenticated; the remaining fields are the profile captured at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "canAccessIvrs")]
    pub can_access_ivrs: bool,
    #[serde(rename = "canAccessWhatsapp")]
    pub can_access_whatsapp: bool,
    /// Derived once at login from the first letters of the name.
    /// Profile refreshes keep this value; it is never recomputed.
    pub initials: String,
}

impl Session {
    /// Build a session from a successful login response.
    pub fn from_login(token: String, user: UserProfile) -> Self {
        let initials = initials_of(&user.first_name, &user.last_name);
        Self {
            token,
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            can_access_ivrs: user.can_access_ivrs,
            can_access_whatsapp: user.can_access_whatsapp,
            initials,
        }
    }

    /// True when either access flag differs from `fresh`.
    pub fn permissions_differ(&self, fresh: &UserProfile) -> bool {
        self.can_access_ivrs != fresh.can_access_ivrs
            || self.can_access_whatsapp != fresh.can_access_whatsapp
    }

    /// Shallow-merge a freshly fetched profile into the session.
    ///
    /// Fresh fields overwrite; the token and the derived initials are retained.
    pub fn apply_profile(&mut self, fresh: &UserProfile) {
        self.id = fresh.id;
        self.first_name = fresh.first_name.clone();
        self.last_name = fresh.last_name.clone();
        self.email = fresh.email.clone();
        self.role = fresh.role;
        self.can_access_ivrs = fresh.can_access_ivrs;
        self.can_access_whatsapp = fresh.can_access_whatsapp;
    }
}

fn initials_of(first_name: &str, last_name: &str) -> String {
    first_name
        .chars()
        .next()
        .into_iter()
        .chain(last_name.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Durable storage for the session record.
///
/// One JSON file named after [`STORAGE_KEY`] in the console's data directory,
/// the desktop equivalent of the browser build's localStorage entry.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Read the persisted record back.
    ///
    /// A record that cannot be read or parsed is deleted so the next start
    /// does not trip over it again, and `None` is returned. Expiry is not
    /// checked here; the expiry sentinel owns that.
    pub fn load(&self) -> Option<Session> {
        let path = self.record_path();
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "failed to read stored session, discarding");
                self.remove_record(&path);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "stored session is corrupt, discarding");
                self.remove_record(&path);
                None
            }
        }
    }

    /// Save the record to disk.
    pub fn save(&self, session: &Session) -> Result<()> {
        let path = self.record_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(path, contents).context("Failed to write session record")?;
        Ok(())
    }

    /// Delete the record. A no-op when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let path = self.record_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to delete session record")?;
        }
        Ok(())
    }

    fn remove_record(&self, path: &std::path::Path) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(error = %e, "failed to delete session record");
        }
    }

    fn record_path(&self) -> PathBuf {
        self.dir.join(format!("{STORAGE_KEY}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@vocero.example".to_string(),
            role: Role::Admin,
            can_access_ivrs: true,
            can_access_whatsapp: false,
        }
    }

    #[test]
    fn test_initials_derivation() {
        let session = Session::from_login("T".to_string(), profile());
        assert_eq!(session.initials, "AL");

        let mut lowercase = profile();
        lowercase.first_name = "ana".to_string();
        lowercase.last_name = "lopez".to_string();
        assert_eq!(Session::from_login("T".to_string(), lowercase).initials, "AL");

        let mut partial = profile();
        partial.last_name = String::new();
        assert_eq!(Session::from_login("T".to_string(), partial).initials, "A");
    }

    #[test]
    fn test_record_uses_console_wire_names() {
        let session = Session::from_login("T".to_string(), profile());
        let value = serde_json::to_value(&session).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for expected in [
            "token",
            "id",
            "firstName",
            "lastName",
            "email",
            "role",
            "canAccessIvrs",
            "canAccessWhatsapp",
            "initials",
        ] {
            assert!(keys.contains(&expected), "missing key {expected}");
        }
        assert_eq!(value["role"], "ADMIN");
    }

    #[test]
    fn test_apply_profile_keeps_token_and_initials() {
        let mut session = Session::from_login("T".to_string(), profile());
        let mut fresh = profile();
        fresh.first_name = "Anabel".to_string();
        fresh.can_access_whatsapp = true;

        assert!(session.permissions_differ(&fresh));
        session.apply_profile(&fresh);

        assert_eq!(session.token, "T");
        assert_eq!(session.initials, "AL");
        assert_eq!(session.first_name, "Anabel");
        assert!(session.can_access_whatsapp);
        assert!(!session.permissions_differ(&fresh));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.load().is_none());

        let session = Session::from_login("T".to_string(), profile());
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear().unwrap();
        assert!(store.load().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_record_self_heals() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        let path = dir.path().join(format!("{STORAGE_KEY}.json"));
        std::fs::write(&path, "not valid json {{").unwrap();

        assert!(store.load().is_none());
        assert!(!path.exists(), "corrupt record should have been deleted");
    }
}
