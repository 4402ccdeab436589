//! Session Store
//!
//! Persists the authenticated identity and its bearer credential across
//! restarts. The two durable entries are always written and cleared together;
//! a half-populated or unparsable pair is discarded on load.

use std::fmt;
use std::rc::Rc;

use aumryx_shared::Identity;
use tracing::warn;

use crate::error::StorageError;
use crate::storage::KeyValueStorage;

pub const STORAGE_TOKEN_KEY: &str = "auth_token";
pub const STORAGE_USER_KEY: &str = "aumryx_user";

/// Opaque bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Either nothing is cached or both halves are.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Empty,
    Active {
        identity: Identity,
        credential: Credential,
    },
}

impl Session {
    pub fn is_active(&self) -> bool {
        matches!(self, Session::Active { .. })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Active { identity, .. } => Some(identity),
            Session::Empty => None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Session::Active { credential, .. } => Some(credential),
            Session::Empty => None,
        }
    }
}

/// Cheap to clone; clones share the same backing storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted session.
    ///
    /// Never fails: corrupt, truncated or half-written state is removed and
    /// reported as [`Session::Empty`].
    pub fn load(&self) -> Session {
        let user = self.storage.get(STORAGE_USER_KEY);
        let token = self.storage.get(STORAGE_TOKEN_KEY);

        match (user, token) {
            (None, None) => Session::Empty,
            (Some(raw), Some(token)) if !token.is_empty() => {
                match serde_json::from_str::<Identity>(&raw) {
                    Ok(identity) if !identity.id.is_empty() => Session::Active {
                        identity,
                        credential: Credential::new(token),
                    },
                    Ok(_) => self.discard("stored identity has no id"),
                    Err(e) => self.discard(&e.to_string()),
                }
            }
            _ => self.discard("stored session is only partially present"),
        }
    }

    fn discard(&self, reason: &str) -> Session {
        warn!(reason, "discarding invalid stored session");
        if let Err(e) = self.clear() {
            warn!(error = %e, "failed to clear invalid stored session");
        }
        Session::Empty
    }

    /// Replace the stored session wholesale in a single batch write.
    ///
    /// The identity is stored normalized, so `load` returns it unchanged.
    pub fn save(&self, identity: &Identity, credential: &Credential) -> Result<(), StorageError> {
        let mut stored = identity.clone();
        stored.normalize();
        let user = serde_json::to_string(&stored)?;
        self.storage.set_many(&[
            (STORAGE_USER_KEY, user.as_str()),
            (STORAGE_TOKEN_KEY, credential.expose()),
        ])
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage
            .remove_many(&[STORAGE_USER_KEY, STORAGE_TOKEN_KEY])
    }

    /// Credential of the current valid session, if any.
    pub fn credential(&self) -> Option<Credential> {
        match self.load() {
            Session::Active { credential, .. } => Some(credential),
            Session::Empty => None,
        }
    }
}
