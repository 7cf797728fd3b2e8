//! Authentication primitives: credentials, password digests, session grants
//! and the operator capability.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Minimum accepted length of a new operator password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;
/// How long a session grant stays valid after issuance.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

const HASH_SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// New password is shorter than the minimum.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use tracker_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A password that satisfies the minimum length policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a candidate password.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.chars().count() < MIN_PASSWORD_CHARS {
            return Err(CredentialValidationError::PasswordTooShort {
                min: MIN_PASSWORD_CHARS,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plain-text password, for hashing only.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Salted SHA-256 password digest stored as `sha256$<salt-hex>$<digest-hex>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn derive<R: RngCore + ?Sized>(password: &NewPassword, rng: &mut R) -> Self {
        let mut salt = [0_u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        Self::with_salt(password.as_str(), &salt)
    }

    fn with_salt(password: &str, salt: &[u8]) -> Self {
        let digest = digest(password, salt);
        Self(format!("{HASH_SCHEME}${}${}", hex::encode(salt), hex::encode(digest)))
    }

    /// Wrap a digest read back from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Encoded digest suitable for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `password` produced this digest.
    ///
    /// Malformed stored values never verify.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let mut parts = self.0.split('$');
        let (Some(HASH_SCHEME), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
            return false;
        };
        digest(password, &salt).as_slice().ct_eq(&expected).into()
    }
}

fn digest(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Proof of a successful login carried by the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: Uuid,
    pub issued_at: DateTime<Utc>,
}

impl SessionGrant {
    /// Issue a fresh grant at `now`.
    #[must_use]
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4(),
            issued_at: now,
        }
    }

    /// Whether the grant is still inside its lifetime at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && now - self.issued_at < Duration::hours(SESSION_LIFETIME_HOURS)
    }
}

/// Capability proving the caller is the authenticated operator.
///
/// Only the access gate mints values of this type, and every mutating
/// driving-port method takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    username: String,
}

impl Operator {
    pub(crate) fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Username of the signed-in operator.
    pub fn username(&self) -> &str {
        &self.username
    }
}
