//! In-memory user account directory
//!
//! Accounts are keyed by username with a secondary id index, so both kinds
//! of lookup are O(1) average. Passwords are only ever stored as bcrypt
//! hashes, which carry their own salt and cost. Usernames are trimmed on
//! every entry point, so `" ada "` and `"ada"` name the same account.

use std::collections::HashMap;
use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Collection, Record};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("Username already taken: {username}")]
    UsernameTaken { username: String },

    #[error("Unknown user: {username}")]
    UnknownUser { username: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Duplicate user id {id} in imported data")]
    DuplicateId { id: u64 },

    #[error("Malformed account at position {index}: {message}")]
    Malformed { index: usize, message: String },

    #[error("Failed to hash password: {message}")]
    Hashing { message: String },
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// A stored user account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl UserAccount {
    /// Whether the account may currently sign in at all
    pub fn can_sign_in(&self) -> bool {
        self.active && !self.locked
    }
}

/// Bcrypt hash of `password` at the given cost
pub fn hash_password(password: &str, cost: u32) -> DirectoryResult<String> {
    hash(password, cost).map_err(|e: BcryptError| DirectoryError::Hashing {
        message: e.to_string(),
    })
}

/// Check `password` against a stored bcrypt hash
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}

fn normalize_username(username: &str) -> &str {
    username.trim()
}

#[derive(Debug)]
pub struct UserDirectory {
    users: HashMap<String, UserAccount>,
    ids: HashMap<u64, String>,
    hash_cost: u32,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::with_hash_cost(DEFAULT_COST)
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory hashing new passwords at `cost` (bcrypt accepts 4..=31)
    pub fn with_hash_cost(cost: u32) -> Self {
        Self {
            users: HashMap::new(),
            ids: HashMap::new(),
            hash_cost: cost,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a new account and return its id
    pub fn create_user(&mut self, username: &str, password: &str, email: &str) -> DirectoryResult<u64> {
        let username = normalize_username(username);
        validate_input(username, password, email)?;

        if self.users.contains_key(username) {
            return Err(DirectoryError::UsernameTaken {
                username: username.to_string(),
            });
        }

        let id = self.next_free_id();
        let account = UserAccount {
            id,
            username: username.to_string(),
            email: email.trim().to_string(),
            password_hash: hash_password(password, self.hash_cost)?,
            active: true,
            locked: false,
            created_at: Utc::now(),
        };

        self.ids.insert(id, account.username.clone());
        self.users.insert(account.username.clone(), account);
        tracing::info!(activity = true, user_id = id, "Created user account");
        Ok(id)
    }

    /// Smallest positive id not currently assigned
    fn next_free_id(&self) -> u64 {
        // At most len() ids are taken, so this ends within len() + 1 attempts
        (1..).find(|id| !self.ids.contains_key(id)).unwrap_or(1)
    }

    /// True only for an existing, active, unlocked account with a matching password
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        match self.get_user(username) {
            Some(account) => account.can_sign_in() && verify_password(password, &account.password_hash),
            None => false,
        }
    }

    pub fn get_user(&self, username: &str) -> Option<&UserAccount> {
        self.users.get(normalize_username(username))
    }

    pub fn get_user_by_id(&self, id: u64) -> Option<&UserAccount> {
        self.ids.get(&id).and_then(|username| self.users.get(username))
    }

    pub fn delete_user(&mut self, username: &str) -> DirectoryResult<UserAccount> {
        let username = normalize_username(username);
        let account = self
            .users
            .remove(username)
            .ok_or_else(|| DirectoryError::UnknownUser {
                username: username.to_string(),
            })?;
        self.ids.remove(&account.id);
        tracing::info!(activity = true, user_id = account.id, "Deleted user account");
        Ok(account)
    }

    pub fn set_active(&mut self, username: &str, active: bool) -> DirectoryResult<()> {
        self.account_mut(username)?.active = active;
        Ok(())
    }

    pub fn set_locked(&mut self, username: &str, locked: bool) -> DirectoryResult<()> {
        self.account_mut(username)?.locked = locked;
        Ok(())
    }

    fn account_mut(&mut self, username: &str) -> DirectoryResult<&mut UserAccount> {
        let username = normalize_username(username);
        self.users
            .get_mut(username)
            .ok_or_else(|| DirectoryError::UnknownUser {
                username: username.to_string(),
            })
    }

    /// Accounts as records, ordered by id
    pub fn to_collection(&self) -> DirectoryResult<Collection> {
        let mut accounts: Vec<&UserAccount> = self.users.values().collect();
        accounts.sort_by_key(|account| account.id);

        accounts
            .into_iter()
            .enumerate()
            .map(|(index, account)| {
                serde_json::to_value(account)
                    .map_err(|e| e.to_string())
                    .and_then(|value| Record::from_value(value).map_err(|e| e.to_string()))
                    .map_err(|message| DirectoryError::Malformed { index, message })
            })
            .collect()
    }

    /// Rebuild a directory from records produced by [`UserDirectory::to_collection`]
    pub fn from_collection(collection: &Collection) -> DirectoryResult<Self> {
        let mut directory = Self::new();

        for (index, record) in collection.iter().enumerate() {
            let account: UserAccount = serde_json::from_value(record.clone().into_value())
                .map_err(|e| DirectoryError::Malformed {
                    index,
                    message: e.to_string(),
                })?;

            if directory.ids.contains_key(&account.id) {
                return Err(DirectoryError::DuplicateId { id: account.id });
            }
            if directory.users.contains_key(&account.username) {
                return Err(DirectoryError::UsernameTaken {
                    username: account.username,
                });
            }

            directory.ids.insert(account.id, account.username.clone());
            directory.users.insert(account.username.clone(), account);
        }

        Ok(directory)
    }
}

fn validate_input(username: &str, password: &str, email: &str) -> DirectoryResult<()> {
    if username.is_empty() {
        return Err(DirectoryError::InvalidInput {
            field: "username".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if password.is_empty() {
        return Err(DirectoryError::InvalidInput {
            field: "password".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DirectoryError::InvalidInput {
            field: "email".to_string(),
            reason: format!("'{email}' is not an email address"),
        }),
    }
}
