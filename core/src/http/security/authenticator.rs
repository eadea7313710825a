//! Credential lookup and request authentication.
//!
//! [`CredentialLookup`] is the one capability the gate needs from a user
//! store. [`InMemoryCredentialStore`] satisfies it with credentials fixed at
//! startup; a persistent store can replace it without touching the gate.
//!
//! [`SessionAuthenticator`] is the middleware-facing [`Authenticator`]: it
//! resolves the session cookie of a request into a [`User`].

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::HttpMessage;

use crate::http::error::AuthError;
use crate::http::security::config::Authenticator;
use crate::http::security::gate::AccessGate;
use crate::http::security::user::{Credential, User};

/// Looks up stored credentials by username.
pub trait CredentialLookup: Send + Sync {
    fn lookup_credential(&self, username: &str) -> Option<Credential>;
}

/// In-memory credential store, read-only once built.
///
/// # Example
/// ```
/// use access_gate_core::http::security::{
///     Credential, CredentialLookup, InMemoryCredentialStore,
/// };
///
/// let store = InMemoryCredentialStore::new()
///     .with_user(Credential::with_encoded_password("user", "password".into()).roles(&["USER"]));
///
/// assert!(store.lookup_credential("user").is_some());
/// assert!(store.lookup_credential("nobody").is_none());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, Credential>,
}

impl InMemoryCredentialStore {
    /// Creates a store with no users.
    pub fn new() -> Self {
        InMemoryCredentialStore {
            users: HashMap::new(),
        }
    }

    /// Adds a credential. A username that is already registered keeps its
    /// first credential.
    pub fn with_user(mut self, credential: Credential) -> Self {
        use std::collections::hash_map::Entry;
        match self.users.entry(credential.get_username().to_string()) {
            Entry::Occupied(e) => {
                log::warn!("User {} already exists, skipping", e.key());
            }
            Entry::Vacant(e) => {
                e.insert(credential);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialLookup for InMemoryCredentialStore {
    fn lookup_credential(&self, username: &str) -> Option<Credential> {
        self.users.get(username).cloned()
    }
}

/// Resolves the session cookie of a request into the logged-in [`User`].
#[derive(Clone)]
pub struct SessionAuthenticator {
    gate: Arc<AccessGate>,
}

impl SessionAuthenticator {
    pub fn new(gate: Arc<AccessGate>) -> Self {
        SessionAuthenticator { gate }
    }
}

impl Authenticator for SessionAuthenticator {
    /// A failed lookup is left in the request extensions as an [`AuthError`]
    /// so the authorizer can report it without a second lookup.
    fn get_user(&self, req: &ServiceRequest) -> Option<User> {
        let cookie = req.cookie(self.gate.get_session_config().get_cookie_name())?;
        match self.gate.current_user(cookie.value()) {
            Ok(user) => Some(user),
            Err(err) => {
                if err == AuthError::SessionExpired {
                    log::debug!("Session for {} expired", req.path());
                }
                req.extensions_mut().insert(err);
                None
            }
        }
    }
}
