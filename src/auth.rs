//! Password verification and bearer-token sessions.

use crate::models::User;
use crate::store::{Store, StoreError};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// Optional prefix of the `Authorization` header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Hash verified when the username is unknown, so both failure paths cost
/// one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// The user store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Hashes a password into an argon2 PHC string with a random salt.
///
/// # Errors
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verifies a password against an argon2 PHC string. Malformed hashes never
/// verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generates a fresh hex-encoded session token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Strips an optional `Bearer ` prefix and surrounding whitespace.
#[must_use]
pub fn strip_bearer(header_value: &str) -> &str {
    let value = header_value.trim();
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim()
}

/// Checks a username/password pair against the store.
///
/// # Errors
/// Returns `AuthError::InvalidCredentials` for an unknown user or a wrong
/// password, `AuthError::Store` if the lookup fails.
pub async fn authenticate(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    match store.find_credentials(username).await? {
        Some(credentials) if verify_password(password, &credentials.password_hash) => {
            Ok(credentials.user)
        }
        Some(_) => {
            warn!(username, "Login rejected: wrong password");
            Err(AuthError::InvalidCredentials)
        }
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            warn!(username, "Login rejected: unknown user");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session owner.
    pub user: User,
    /// Login time.
    pub created_at: DateTime<Utc>,
}

/// In-memory session table keyed by the SHA-256 digest of each token.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    /// Creates an empty session store.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Digest under which a token is stored.
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Opens a session for the user and returns the raw token (only
    /// returned once).
    pub fn open(&self, user: User) -> String {
        let token = generate_token();
        debug!(username = %user.username, "Session opened");
        self.sessions.insert(
            Self::hash_token(&token),
            Session {
                user,
                created_at: Utc::now(),
            },
        );
        token
    }

    /// Resolves a token (with or without `Bearer ` prefix) to its user.
    pub fn resolve(&self, token: &str) -> Option<User> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return None;
        }
        self.sessions
            .get(&Self::hash_token(token))
            .map(|session| session.user.clone())
    }

    /// Closes a session. Returns true if it existed.
    pub fn close(&self, token: &str) -> bool {
        let token = strip_bearer(token);
        self.sessions.remove(&Self::hash_token(token)).is_some()
    }

    /// Closes every session belonging to a user. Returns how many were closed.
    pub fn revoke_user(&self, user_id: i32) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.user.id != user_id);
        before.saturating_sub(self.sessions.len())
    }

    /// Closes every session.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no open sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;

    fn user(id: i32, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            name: username.to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("S3cret", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("anything", "plaintext"));
    }

    #[test]
    fn test_generate_token_is_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer("  Bearer abc  "), "abc");
    }

    #[test]
    fn test_session_open_resolve_close() {
        let sessions = SessionStore::new();
        let token = sessions.open(user(2, "john"));

        assert_eq!(sessions.resolve(&token).map(|u| u.id), Some(2));
        assert_eq!(
            sessions.resolve(&format!("Bearer {}", token)).map(|u| u.id),
            Some(2)
        );

        assert!(sessions.close(&format!("Bearer {}", token)));
        assert!(sessions.resolve(&token).is_none());
        assert!(!sessions.close(&token));
    }

    #[test]
    fn test_session_store_does_not_keep_raw_token() {
        let sessions = SessionStore::new();
        let token = sessions.open(user(2, "john"));
        assert!(sessions.sessions.get(&token).is_none());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_or_empty_token() {
        let sessions = SessionStore::new();
        assert!(sessions.resolve("deadbeef").is_none());
        assert!(sessions.resolve("Bearer ").is_none());
        assert!(sessions.resolve("").is_none());
    }

    #[test]
    fn test_each_login_gets_distinct_token() {
        let sessions = SessionStore::new();
        let a = sessions.open(user(2, "john"));
        let b = sessions.open(user(2, "john"));
        assert_ne!(a, b);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_revoke_user_sessions() {
        let sessions = SessionStore::new();
        let john = sessions.open(user(2, "john"));
        sessions.open(user(2, "john"));
        let jane = sessions.open(user(3, "jane"));

        assert_eq!(sessions.revoke_user(2), 2);
        assert!(sessions.resolve(&john).is_none());
        assert!(sessions.resolve(&jane).is_some());

        sessions.clear();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_against_seeded_store() {
        let store = MemoryStore::seeded();

        let user = authenticate(&store, "admin", "admin123").await.unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, Role::Admin);

        assert!(matches!(
            authenticate(&store, "admin", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&store, "nobody", "admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
