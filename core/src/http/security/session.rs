//! Server-side sessions.
//!
//! # Features
//! - Opaque random session ids, handed to the client in a cookie
//! - Idle timeout checked on every access, plus a sweep for abandoned entries
//! - Saved requests: the URL an anonymous client asked for before being sent
//!   to the login page
//!
//! The [`SessionStore`] is the single source of truth for who is logged in.
//! Both maps sit behind a `Mutex`; concurrent logins and logouts serialize on
//! it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use actix_web::cookie::{Cookie, SameSite};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::http::error::AuthError;

const TOKEN_LENGTH: usize = 32;

// =============================================================================
// Session
// =============================================================================

/// Server-side record proving a user has authenticated.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    username: String,
    created_at: SystemTime,
    originally_requested_path: Option<String>,
}

impl Session {
    /// Opaque token referencing this session.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_created_at(&self) -> SystemTime {
        self.created_at
    }

    /// The URL the client asked for before it was sent to the login page.
    pub fn get_originally_requested_path(&self) -> Option<&str> {
        self.originally_requested_path.as_deref()
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session cookie and expiry settings.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use access_gate_core::http::security::SessionConfig;
///
/// let config = SessionConfig::new()
///     .cookie_name("SID")
///     .timeout(Duration::from_secs(15 * 60))
///     .cookie_secure(true);
///
/// assert_eq!(config.get_cookie_name(), "SID");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    cookie_name: String,
    saved_request_cookie_name: String,
    /// Idle timeout; `None` keeps sessions until logout or restart.
    timeout: Option<Duration>,
    /// How long a saved request survives, independent of `timeout`.
    saved_request_timeout: Duration,
    max_saved_requests: usize,
    cookie_secure: bool,
    cookie_same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            cookie_name: "GATE_SESSION".to_string(),
            saved_request_cookie_name: "GATE_SAVED_REQUEST".to_string(),
            timeout: Some(Duration::from_secs(30 * 60)),
            saved_request_timeout: Duration::from_secs(5 * 60),
            max_saved_requests: 10_000,
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
        }
    }

    pub fn cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = name.to_string();
        self
    }

    pub fn saved_request_cookie_name(mut self, name: &str) -> Self {
        self.saved_request_cookie_name = name.to_string();
        self
    }

    /// Sets the idle timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sessions never expire on their own.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn saved_request_timeout(mut self, timeout: Duration) -> Self {
        self.saved_request_timeout = timeout;
        self
    }

    /// Upper bound on saved requests held at once. The oldest is evicted first.
    pub fn max_saved_requests(mut self, max: usize) -> Self {
        self.max_saved_requests = max;
        self
    }

    /// Only send the cookies over HTTPS.
    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    pub fn get_cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn get_saved_request_cookie_name(&self) -> &str {
        &self.saved_request_cookie_name
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_saved_request_timeout(&self) -> Duration {
        self.saved_request_timeout
    }

    pub fn get_max_saved_requests(&self) -> usize {
        self.max_saved_requests
    }

    /// Cookie carrying a session id.
    pub fn session_cookie(&self, session_id: &str) -> Cookie<'static> {
        self.build_cookie(self.cookie_name.clone(), session_id.to_string())
    }

    /// Cookie carrying a saved-request token.
    pub fn saved_request_cookie(&self, token: &str) -> Cookie<'static> {
        self.build_cookie(self.saved_request_cookie_name.clone(), token.to_string())
    }

    /// Cookie instructing the client to drop the named cookie.
    pub fn removal_cookie(&self, name: &str) -> Cookie<'static> {
        let mut cookie = self.build_cookie(name.to_string(), String::new());
        cookie.make_removal();
        cookie
    }

    fn build_cookie(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(self.cookie_same_site)
            .finish()
    }
}

// =============================================================================
// Session Store
// =============================================================================

struct SessionEntry {
    session: Session,
    last_accessed: Instant,
}

struct SavedRequest {
    url: String,
    saved_at: Instant,
}

/// In-memory store of live sessions and saved requests.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    saved_requests: Mutex<HashMap<String, SavedRequest>>,
    timeout: Option<Duration>,
    saved_request_ttl: Duration,
    max_saved_requests: usize,
}

impl SessionStore {
    pub fn new(timeout: Option<Duration>) -> Self {
        let defaults = SessionConfig::new();
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            saved_requests: Mutex::new(HashMap::new()),
            timeout,
            saved_request_ttl: defaults.get_saved_request_timeout(),
            max_saved_requests: defaults.get_max_saved_requests(),
        }
    }

    /// Store configured from the timeouts and limits of `config`.
    pub fn from_config(config: &SessionConfig) -> Self {
        SessionStore::new(config.get_timeout()).saved_request_limits(
            config.get_saved_request_timeout(),
            config.get_max_saved_requests(),
        )
    }

    /// Lifetime and capacity of saved requests.
    pub fn saved_request_limits(mut self, ttl: Duration, capacity: usize) -> Self {
        self.saved_request_ttl = ttl;
        self.max_saved_requests = capacity.max(1);
        self
    }

    /// Issues a new session under a fresh id.
    pub fn create(&self, username: &str, originally_requested_path: Option<String>) -> Session {
        let mut sessions = lock(&self.sessions);
        let mut id = generate_token();
        while sessions.contains_key(&id) {
            id = generate_token();
        }

        let session = Session {
            id: id.clone(),
            username: username.to_string(),
            created_at: SystemTime::now(),
            originally_requested_path,
        };
        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_accessed: Instant::now(),
            },
        );
        session
    }

    /// Looks up a live session and marks it as accessed.
    ///
    /// An expired session is removed and reported as
    /// [`AuthError::SessionExpired`]; an unknown id as
    /// [`AuthError::NotAuthenticated`].
    pub fn get(&self, session_id: &str) -> Result<Session, AuthError> {
        let mut sessions = lock(&self.sessions);
        let now = Instant::now();

        let entry = sessions
            .get_mut(session_id)
            .ok_or(AuthError::NotAuthenticated)?;
        if self.is_expired(entry.last_accessed, now) {
            sessions.remove(session_id);
            return Err(AuthError::SessionExpired);
        }

        entry.last_accessed = now;
        Ok(entry.session.clone())
    }

    /// Destroys a session. Returns it if it was present.
    pub fn remove(&self, session_id: &str) -> Option<Session> {
        lock(&self.sessions)
            .remove(session_id)
            .map(|entry| entry.session)
    }

    /// Remembers `url` for an anonymous client.
    ///
    /// Reuses `token` when it still refers to a saved request so that a
    /// client bouncing between protected pages holds a single entry. When
    /// the store is full, expired entries go first, then the oldest one.
    pub fn save_request(&self, token: Option<&str>, url: &str) -> String {
        let mut saved = lock(&self.saved_requests);
        let token = match token {
            Some(token) if saved.contains_key(token) => token.to_string(),
            _ => {
                if saved.len() >= self.max_saved_requests {
                    let now = Instant::now();
                    saved.retain(|_, entry| !self.is_saved_request_expired(entry.saved_at, now));
                }
                if saved.len() >= self.max_saved_requests {
                    let oldest = saved
                        .iter()
                        .min_by_key(|(_, entry)| entry.saved_at)
                        .map(|(token, _)| token.clone());
                    if let Some(oldest) = oldest {
                        log::debug!("Saved request limit reached, evicting the oldest entry");
                        saved.remove(&oldest);
                    }
                }

                let mut token = generate_token();
                while saved.contains_key(&token) {
                    token = generate_token();
                }
                token
            }
        };

        saved.insert(
            token.clone(),
            SavedRequest {
                url: url.to_string(),
                saved_at: Instant::now(),
            },
        );
        token
    }

    /// Removes and returns the URL saved under `token`, unless it expired.
    pub fn take_saved_request(&self, token: &str) -> Option<String> {
        let saved = lock(&self.saved_requests).remove(token)?;
        if self.is_saved_request_expired(saved.saved_at, Instant::now()) {
            return None;
        }
        Some(saved.url)
    }

    /// Drops every expired session and saved request.
    ///
    /// Returns the number of sessions removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();

        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry.last_accessed, now));
        let purged = before - sessions.len();
        drop(sessions);

        lock(&self.saved_requests)
            .retain(|_, saved| !self.is_saved_request_expired(saved.saved_at, now));
        purged
    }

    /// Number of live (possibly not yet swept) sessions.
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, since: Instant, now: Instant) -> bool {
        self.timeout
            .is_some_and(|timeout| now.saturating_duration_since(since) >= timeout)
    }

    fn is_saved_request_expired(&self, since: Instant, now: Instant) -> bool {
        now.saturating_duration_since(since) >= self.saved_request_ttl
    }
}

// A panic while holding the lock leaves the maps consistent: every mutation
// is a single insert/remove/retain.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(None);
        let session = store.create("user", Some("/dashboard".to_string()));

        assert_eq!(session.get_id().len(), TOKEN_LENGTH);
        let found = store.get(session.get_id()).unwrap();
        assert_eq!(found.get_username(), "user");
        assert_eq!(found.get_originally_requested_path(), Some("/dashboard"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = SessionStore::new(None);
        let a = store.create("user", None);
        let b = store.create("user", None);
        assert_ne!(a.get_id(), b.get_id());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_id() {
        let store = SessionStore::new(None);
        assert_eq!(store.get("missing").unwrap_err(), AuthError::NotAuthenticated);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = SessionStore::new(None);
        let session = store.create("user", None);

        assert!(store.remove(session.get_id()).is_some());
        assert!(store.remove(session.get_id()).is_none());
        assert_eq!(
            store.get(session.get_id()).unwrap_err(),
            AuthError::NotAuthenticated
        );
    }

    #[test]
    fn test_expired_session_is_removed() {
        let store = SessionStore::new(Some(Duration::ZERO));
        let session = store.create("user", None);

        assert_eq!(
            store.get(session.get_id()).unwrap_err(),
            AuthError::SessionExpired
        );
        // Gone after the first expired lookup
        assert_eq!(
            store.get(session.get_id()).unwrap_err(),
            AuthError::NotAuthenticated
        );
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(Some(Duration::ZERO))
            .saved_request_limits(Duration::ZERO, 16);
        store.create("user", None);
        store.create("user", None);
        let token = store.save_request(None, "/dashboard");

        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());
        assert!(store.take_saved_request(&token).is_none());
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let store = SessionStore::new(Some(Duration::from_secs(3600)));
        let session = store.create("user", None);

        assert_eq!(store.purge_expired(), 0);
        assert!(store.get(session.get_id()).is_ok());
    }

    #[test]
    fn test_saved_request_taken_once() {
        let store = SessionStore::new(None);
        let token = store.save_request(None, "/dashboard?tab=2");

        assert_eq!(
            store.take_saved_request(&token).as_deref(),
            Some("/dashboard?tab=2")
        );
        assert!(store.take_saved_request(&token).is_none());
    }

    #[test]
    fn test_saved_request_token_reused() {
        let store = SessionStore::new(None);
        let token = store.save_request(None, "/first");
        let again = store.save_request(Some(&token), "/second");
        assert_eq!(token, again);
        assert_eq!(store.take_saved_request(&token).as_deref(), Some("/second"));

        // Unknown token gets replaced by a fresh one
        let fresh = store.save_request(Some("forged"), "/third");
        assert_ne!(fresh, "forged");
    }

    #[test]
    fn test_saved_request_expires_without_session_timeout() {
        let store = SessionStore::new(None).saved_request_limits(Duration::ZERO, 16);
        let token = store.save_request(None, "/dashboard");
        assert!(store.take_saved_request(&token).is_none());

        store.save_request(None, "/reports");
        store.purge_expired();
        assert!(lock(&store.saved_requests).is_empty());
    }

    #[test]
    fn test_saved_requests_evict_oldest() {
        let store = SessionStore::new(None).saved_request_limits(Duration::from_secs(3600), 2);
        let first = store.save_request(None, "/first");
        std::thread::sleep(Duration::from_millis(5));
        let second = store.save_request(None, "/second");
        std::thread::sleep(Duration::from_millis(5));
        let third = store.save_request(None, "/third");

        assert_eq!(lock(&store.saved_requests).len(), 2);
        assert!(store.take_saved_request(&first).is_none());
        assert_eq!(store.take_saved_request(&second).as_deref(), Some("/second"));
        assert_eq!(store.take_saved_request(&third).as_deref(), Some("/third"));
    }

    #[test]
    fn test_reused_token_does_not_evict() {
        let store = SessionStore::new(None).saved_request_limits(Duration::from_secs(3600), 1);
        let token = store.save_request(None, "/first");
        let again = store.save_request(Some(&token), "/second");
        assert_eq!(token, again);
        assert_eq!(store.take_saved_request(&token).as_deref(), Some("/second"));
    }

    #[test]
    fn test_session_config_cookies() {
        let config = SessionConfig::new().cookie_secure(true);

        let cookie = config.session_cookie("abc");
        assert_eq!(cookie.name(), "GATE_SESSION");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));

        let saved = config.saved_request_cookie("xyz");
        assert_eq!(saved.name(), "GATE_SAVED_REQUEST");

        let removal = config.removal_cookie("GATE_SESSION");
        assert_eq!(removal.value(), "");
        assert!(removal.max_age().is_some_and(|age| age.is_zero()));
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.get_timeout(), Some(Duration::from_secs(1800)));
        assert_eq!(config.get_saved_request_timeout(), Duration::from_secs(300));
        assert_eq!(config.get_max_saved_requests(), 10_000);
        assert_eq!(config.no_timeout().get_timeout(), None);
    }
}
