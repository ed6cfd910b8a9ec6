//! Username / password-hash storage and the login flow on top of it
//!
//! Passwords are hashed with bcrypt; only hashes are ever stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::{KaiError, Result};

/// Lookup and insert of password hashes by username
pub trait CredentialStore: Send + Sync {
    fn find_hash(&self, username: &str) -> Result<Option<String>>;

    /// Insert a new user; fails if the name is taken
    fn insert(&self, username: &str, password_hash: &str) -> Result<()>;
}

/// In-process store, used for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_hash(&self, username: &str) -> Result<Option<String>> {
        let users = self
            .users
            .lock()
            .map_err(|_| KaiError::Config("credential store lock poisoned".to_string()))?;
        Ok(users.get(username).cloned())
    }

    fn insert(&self, username: &str, password_hash: &str) -> Result<()> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| KaiError::Config("credential store lock poisoned".to_string()))?;
        if users.contains_key(username) {
            return Err(KaiError::Validation(format!(
                "user '{}' already exists",
                username
            )));
        }
        users.insert(username.to_string(), password_hash.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: BTreeMap<String, String>,
}

/// Credentials kept in a JSON file (`users.json` in the state directory)
#[derive(Debug, Clone)]
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<UsersFile> {
        if !self.path.exists() {
            return Ok(UsersFile::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents)
            .map_err(|e| KaiError::parse("users file", e.to_string()))
    }

    fn save(&self, file: &UsersFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn find_hash(&self, username: &str) -> Result<Option<String>> {
        Ok(self.load()?.users.get(username).cloned())
    }

    fn insert(&self, username: &str, password_hash: &str) -> Result<()> {
        let mut file = self.load()?;
        if file.users.contains_key(username) {
            return Err(KaiError::Validation(format!(
                "user '{}' already exists",
                username
            )));
        }
        file.users
            .insert(username.to_string(), password_hash.to_string());
        self.save(&file)
    }
}

/// Register and log in users against a credential store
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_cost(store, bcrypt::DEFAULT_COST)
    }

    /// Use a specific bcrypt cost factor (tests use the minimum)
    pub fn with_cost(store: Arc<dyn CredentialStore>, cost: u32) -> Self {
        Self { store, cost }
    }

    fn validate(username: &str, password: &str) -> Result<String> {
        let username = username.trim();
        if username.is_empty() {
            return Err(KaiError::Validation("username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(KaiError::Validation("password must not be empty".to_string()));
        }
        Ok(username.to_string())
    }

    /// Create a new user and return the stored username
    pub fn register(&self, username: &str, password: &str) -> Result<String> {
        let username = Self::validate(username, password)?;
        let hash = bcrypt::hash(password, self.cost)
            .map_err(|e| KaiError::Validation(format!("could not hash password: {}", e)))?;
        self.store.insert(&username, &hash)?;
        tracing::info!(user = %username, "user registered");
        Ok(username)
    }

    /// Check a password and return the username on success
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let username = Self::validate(username, password)?;
        let hash = self
            .store
            .find_hash(&username)?
            .ok_or_else(|| KaiError::Auth("user not found".to_string()))?;

        let ok = bcrypt::verify(password, &hash)
            .map_err(|e| KaiError::Auth(format!("stored hash is unreadable: {}", e)))?;
        if !ok {
            tracing::warn!(user = %username, "login rejected");
            return Err(KaiError::Auth("incorrect username or password".to_string()));
        }

        tracing::info!(user = %username, "user logged in");
        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service() -> AuthService {
        AuthService::with_cost(Arc::new(MemoryCredentialStore::new()), 4)
    }

    #[test]
    fn test_register_then_login() {
        let auth = service();
        assert_eq!(auth.register(" alice ", "s3cret").unwrap(), "alice");
        assert_eq!(auth.login("alice", "s3cret").unwrap(), "alice");
    }

    #[test]
    fn test_wrong_password_and_unknown_user() {
        let auth = service();
        auth.register("alice", "s3cret").unwrap();

        assert!(matches!(auth.login("alice", "nope"), Err(KaiError::Auth(_))));
        assert!(matches!(auth.login("bob", "s3cret"), Err(KaiError::Auth(_))));
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        let auth = service();
        assert!(matches!(auth.register("", "pw"), Err(KaiError::Validation(_))));
        assert!(matches!(auth.register("alice", ""), Err(KaiError::Validation(_))));
        assert!(matches!(auth.login("  ", "pw"), Err(KaiError::Validation(_))));
    }

    #[test]
    fn test_duplicate_registration() {
        let auth = service();
        auth.register("alice", "one").unwrap();
        assert!(matches!(auth.register("alice", "two"), Err(KaiError::Validation(_))));
        assert!(auth.login("alice", "one").is_ok());
    }

    #[test]
    fn test_stores_hash_not_password() {
        let store = Arc::new(MemoryCredentialStore::new());
        let auth = AuthService::with_cost(store.clone(), 4);
        auth.register("alice", "s3cret").unwrap();

        let hash = store.find_hash("alice").unwrap().unwrap();
        assert_ne!(hash, "s3cret");
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_json_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("users.json");

        let auth = AuthService::with_cost(Arc::new(JsonCredentialStore::new(&path)), 4);
        auth.register("alice", "s3cret").unwrap();

        let reopened = AuthService::with_cost(Arc::new(JsonCredentialStore::new(&path)), 4);
        assert!(reopened.login("alice", "s3cret").is_ok());
        assert!(reopened.register("alice", "again").is_err());
    }
}
