//! The access gate: one object owning the route rules, the credential store
//! and the session store.
//!
//! It is built once at startup, wrapped in an `Arc`, and handed to the
//! middleware and the login handlers. Dropping the last `Arc` at shutdown
//! discards every session.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use access_gate_core::http::security::{
//!     Access, AccessGate, AuthError, Credential, InMemoryCredentialStore, NoOpPasswordEncoder,
//!     RouteRules,
//! };
//!
//! let gate = AccessGate::new(
//!     InMemoryCredentialStore::new()
//!         .with_user(Credential::with_encoded_password("user", "password".into()).roles(&["USER"])),
//! )
//! .password_encoder(NoOpPasswordEncoder)
//! .route_rules(RouteRules::new().permit_all(&["/", "/home"]));
//!
//! let session = gate.authenticate("user", "password").unwrap();
//! assert!(gate.authorize(Some(session.get_id()), "/secret").is_ok());
//!
//! gate.logout(session.get_id());
//! assert_eq!(
//!     gate.authorize(Some(session.get_id()), "/secret"),
//!     Err(AuthError::NotAuthenticated)
//! );
//! ```

use std::sync::{Arc, OnceLock};

use crate::http::error::AuthError;
use crate::http::security::authenticator::CredentialLookup;
use crate::http::security::crypto::{Argon2PasswordEncoder, PasswordEncoder};
use crate::http::security::form_login::FormLoginConfig;
use crate::http::security::route::{Access, RouteRules};
use crate::http::security::session::{Session, SessionConfig, SessionStore};
use crate::http::security::user::User;

// Verified against when the username is unknown, so a miss costs as much as
// a wrong password.
const UNKNOWN_USER_PASSWORD: &str = "userNotFoundPassword";

pub struct AccessGate {
    credentials: Arc<dyn CredentialLookup>,
    password_encoder: Arc<dyn PasswordEncoder>,
    rules: RouteRules,
    form_login: FormLoginConfig,
    session_config: SessionConfig,
    sessions: SessionStore,
    unknown_user_hash: OnceLock<Option<String>>,
}

impl AccessGate {
    /// Creates a gate over `credentials` with Argon2 password verification,
    /// no public routes besides the login endpoints, and default session
    /// settings.
    pub fn new<C: CredentialLookup + 'static>(credentials: C) -> Self {
        let session_config = SessionConfig::new();
        AccessGate {
            credentials: Arc::new(credentials),
            password_encoder: Arc::new(Argon2PasswordEncoder::new()),
            rules: RouteRules::new(),
            form_login: FormLoginConfig::new(),
            sessions: SessionStore::from_config(&session_config),
            session_config,
            unknown_user_hash: OnceLock::new(),
        }
    }

    /// Sets the encoder the stored password hashes were produced with.
    pub fn password_encoder<E: PasswordEncoder + 'static>(mut self, encoder: E) -> Self {
        self.password_encoder = Arc::new(encoder);
        self.unknown_user_hash = OnceLock::new();
        self
    }

    pub fn route_rules(mut self, rules: RouteRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn form_login(mut self, config: FormLoginConfig) -> Self {
        self.form_login = config;
        self
    }

    /// Replaces the session settings. Sessions issued before the call are
    /// discarded.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.sessions = SessionStore::from_config(&config);
        self.session_config = config;
        self
    }

    /// Public or protected. Login and logout endpoints are always public;
    /// everything else goes through the route rules, first match wins,
    /// defaulting to protected.
    pub fn classify(&self, path: &str) -> Access {
        if self.form_login.is_public_endpoint(path) {
            return Access::Public;
        }
        self.rules.classify(path)
    }

    /// Verifies the credentials and opens a session.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        self.authenticate_with_saved_request(username, password, None)
    }

    /// Verifies the credentials and opens a session, carrying over the URL
    /// saved under `saved_request` as the session's originally requested
    /// path.
    pub fn authenticate_with_saved_request(
        &self,
        username: &str,
        password: &str,
        saved_request: Option<&str>,
    ) -> Result<Session, AuthError> {
        let credential = match self.credentials.lookup_credential(username) {
            Some(credential) => credential,
            None => {
                if let Some(hash) = self.unknown_user_hash() {
                    let _ = self.password_encoder.matches(password, hash);
                }
                log::warn!("Failed login for unknown user {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .password_encoder
            .matches(password, credential.get_password_hash())
        {
            log::warn!("Failed login for {}: bad password", username);
            return Err(AuthError::InvalidCredentials);
        }

        let saved_url = saved_request.and_then(|token| self.sessions.take_saved_request(token));
        let session = self
            .sessions
            .create(credential.get_username(), saved_url);
        log::info!("User {} logged in", session.get_username());
        Ok(session)
    }

    /// Succeeds for public paths; for protected ones requires `session_id`
    /// to name a live session.
    pub fn authorize(&self, session_id: Option<&str>, path: &str) -> Result<(), AuthError> {
        if self.classify(path) == Access::Public {
            return Ok(());
        }
        let session_id = session_id.ok_or(AuthError::NotAuthenticated)?;
        self.sessions.get(session_id).map(|_| ())
    }

    /// Destroys the session if present. Calling it again is a no-op.
    pub fn logout(&self, session_id: &str) {
        if let Some(session) = self.sessions.remove(session_id) {
            log::info!("User {} logged out", session.get_username());
        }
    }

    /// Resolves a live session into its principal.
    ///
    /// Fails with `NotAuthenticated` if the credential behind the session is
    /// gone from the store.
    pub fn current_user(&self, session_id: &str) -> Result<User, AuthError> {
        let session = self.sessions.get(session_id)?;
        self.credentials
            .lookup_credential(session.get_username())
            .map(|credential| User::from(&credential))
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Remembers where an anonymous client was heading. See
    /// [`SessionStore::save_request`].
    pub fn save_request(&self, token: Option<&str>, url: &str) -> String {
        self.sessions.save_request(token, url)
    }

    /// Sweeps expired sessions and saved requests.
    pub fn purge_expired(&self) -> usize {
        let purged = self.sessions.purge_expired();
        if purged > 0 {
            log::debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn get_form_login_config(&self) -> &FormLoginConfig {
        &self.form_login
    }

    pub fn get_session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    fn unknown_user_hash(&self) -> Option<&str> {
        self.unknown_user_hash
            .get_or_init(|| self.password_encoder.encode(UNKNOWN_USER_PASSWORD).ok())
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::security::authenticator::InMemoryCredentialStore;
    use crate::http::security::crypto::NoOpPasswordEncoder;
    use crate::http::security::user::Credential;

    fn gate() -> AccessGate {
        AccessGate::new(InMemoryCredentialStore::new().with_user(
            Credential::with_encoded_password("user", "password".to_string()).roles(&["USER"]),
        ))
        .password_encoder(NoOpPasswordEncoder)
        .route_rules(RouteRules::new().permit_all(&["/", "/home"]))
    }

    #[test]
    fn test_classify_public_paths() {
        let gate = gate();
        for path in ["/", "/home", "/login", "/logout", "/login?error"] {
            assert_eq!(gate.classify(path), Access::Public, "{}", path);
        }
    }

    #[test]
    fn test_classify_defaults_to_protected() {
        let gate = gate();
        for path in ["/secret", "/dashboard", "/hello", "/home/more", "/logout/x"] {
            assert_eq!(gate.classify(path), Access::Protected, "{}", path);
        }
    }

    #[test]
    fn test_login_endpoints_beat_rules() {
        let gate = gate().route_rules(RouteRules::new().authenticated(&["/**"]));
        assert_eq!(gate.classify("/login"), Access::Public);
        assert_eq!(gate.classify("/logout"), Access::Public);
        assert_eq!(gate.classify("/"), Access::Protected);
    }

    #[test]
    fn test_authenticate() {
        let gate = gate();

        let session = gate.authenticate("user", "password").unwrap();
        assert_eq!(session.get_username(), "user");
        assert!(session.get_originally_requested_path().is_none());

        assert_eq!(
            gate.authenticate("user", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            gate.authenticate("nobody", "x").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(gate.active_sessions(), 1);
    }

    #[test]
    fn test_authenticate_with_argon2() {
        let encoder = Argon2PasswordEncoder::new();
        let hash = encoder.encode("password").unwrap();
        let gate = AccessGate::new(
            InMemoryCredentialStore::new()
                .with_user(Credential::with_encoded_password("user", hash).roles(&["USER"])),
        );

        assert!(gate.authenticate("user", "password").is_ok());
        assert_eq!(
            gate.authenticate("user", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            gate.authenticate("nobody", "password").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_authorize() {
        let gate = gate();
        let session = gate.authenticate("user", "password").unwrap();

        assert!(gate.authorize(Some(session.get_id()), "/secret").is_ok());
        assert_eq!(
            gate.authorize(Some("unknown"), "/secret"),
            Err(AuthError::NotAuthenticated)
        );
        assert_eq!(
            gate.authorize(None, "/secret"),
            Err(AuthError::NotAuthenticated)
        );
        assert!(gate.authorize(Some("unknown"), "/home").is_ok());
        assert!(gate.authorize(None, "/home").is_ok());
    }

    #[test]
    fn test_logout_revokes_session() {
        let gate = gate();
        let session = gate.authenticate("user", "password").unwrap();

        gate.logout(session.get_id());
        assert_eq!(
            gate.authorize(Some(session.get_id()), "/secret"),
            Err(AuthError::NotAuthenticated)
        );

        // Idempotent
        gate.logout(session.get_id());
        gate.logout("never-existed");
        assert_eq!(gate.active_sessions(), 0);
    }

    #[test]
    fn test_expired_session() {
        let gate = gate().session_config(SessionConfig::new().timeout(Duration::ZERO));
        let session = gate.authenticate("user", "password").unwrap();

        assert_eq!(
            gate.authorize(Some(session.get_id()), "/secret"),
            Err(AuthError::SessionExpired)
        );
    }

    #[test]
    fn test_saved_request_moves_into_session() {
        let gate = gate();
        let token = gate.save_request(None, "/dashboard");

        let session = gate
            .authenticate_with_saved_request("user", "password", Some(&token))
            .unwrap();
        assert_eq!(session.get_originally_requested_path(), Some("/dashboard"));

        // Consumed by the first login
        let again = gate
            .authenticate_with_saved_request("user", "password", Some(&token))
            .unwrap();
        assert!(again.get_originally_requested_path().is_none());
    }

    #[test]
    fn test_failed_login_keeps_saved_request() {
        let gate = gate();
        let token = gate.save_request(None, "/dashboard");

        assert!(gate
            .authenticate_with_saved_request("user", "wrong", Some(&token))
            .is_err());
        let session = gate
            .authenticate_with_saved_request("user", "password", Some(&token))
            .unwrap();
        assert_eq!(session.get_originally_requested_path(), Some("/dashboard"));
    }

    #[test]
    fn test_current_user() {
        let gate = gate();
        let session = gate.authenticate("user", "password").unwrap();

        let user = gate.current_user(session.get_id()).unwrap();
        assert_eq!(user.get_username(), "user");
        assert!(user.has_role("USER"));
        assert_eq!(
            gate.current_user("unknown").unwrap_err(),
            AuthError::NotAuthenticated
        );
    }

    #[test]
    fn test_concurrent_logins() {
        let gate = Arc::new(gate());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    let session = gate.authenticate("user", "password").unwrap();
                    assert!(gate.authorize(Some(session.get_id()), "/secret").is_ok());
                    gate.logout(session.get_id());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(gate.active_sessions(), 0);
    }
}
