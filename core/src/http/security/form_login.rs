//! Form-based login and logout.
//!
//! # Features
//! - POST-based login form processing
//! - Configurable login/logout URLs
//! - Saved request redirect after login
//! - Fresh session id on every login
//!
//! # Example
//! ```rust,ignore
//! use access_gate_core::http::security::form_login::{FormLoginHandler, LoginForm};
//!
//! #[post("/login")]
//! async fn login(
//!     req: HttpRequest,
//!     form: web::Form<LoginForm>,
//!     handler: web::Data<FormLoginHandler>,
//! ) -> actix_web::Result<HttpResponse> {
//!     handler.attempt_authentication(&req, &form).await
//! }
//! ```

use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::http::error::AuthError;
use crate::http::security::gate::AccessGate;
use crate::http::security::session::Session;

// =============================================================================
// Form Login Configuration
// =============================================================================

/// Login and logout endpoints plus the redirect targets around them.
///
/// # Example
/// ```
/// use access_gate_core::http::security::FormLoginConfig;
///
/// let config = FormLoginConfig::new()
///     .login_page("/signin")
///     .default_success_url("/dashboard")
///     .failure_url("/signin?error");
///
/// assert!(config.is_public_endpoint("/signin"));
/// assert!(config.is_public_endpoint("/logout"));
/// ```
#[derive(Debug, Clone)]
pub struct FormLoginConfig {
    /// URL of the login page (GET)
    login_page: String,
    /// URL that processes the login form (POST)
    login_processing_url: String,
    /// Where to go after login when no request was saved
    default_success_url: String,
    /// Ignore the saved request and always go to the default success URL
    always_use_default_success_url: bool,
    failure_url: String,
    /// URL for logout (POST)
    logout_url: String,
    logout_success_url: String,
}

impl Default for FormLoginConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FormLoginConfig {
    pub fn new() -> Self {
        Self {
            login_page: "/login".to_string(),
            login_processing_url: "/login".to_string(),
            default_success_url: "/".to_string(),
            always_use_default_success_url: false,
            failure_url: "/login?error".to_string(),
            logout_url: "/logout".to_string(),
            logout_success_url: "/login?logout".to_string(),
        }
    }

    pub fn login_page(mut self, url: &str) -> Self {
        self.login_page = url.to_string();
        self
    }

    pub fn login_processing_url(mut self, url: &str) -> Self {
        self.login_processing_url = url.to_string();
        self
    }

    pub fn default_success_url(mut self, url: &str) -> Self {
        self.default_success_url = url.to_string();
        self
    }

    pub fn always_use_default_success_url(mut self, always: bool) -> Self {
        self.always_use_default_success_url = always;
        self
    }

    pub fn failure_url(mut self, url: &str) -> Self {
        self.failure_url = url.to_string();
        self
    }

    pub fn logout_url(mut self, url: &str) -> Self {
        self.logout_url = url.to_string();
        self
    }

    pub fn logout_success_url(mut self, url: &str) -> Self {
        self.logout_success_url = url.to_string();
        self
    }

    pub fn get_login_page(&self) -> &str {
        &self.login_page
    }

    pub fn get_login_processing_url(&self) -> &str {
        &self.login_processing_url
    }

    pub fn get_default_success_url(&self) -> &str {
        &self.default_success_url
    }

    pub fn get_failure_url(&self) -> &str {
        &self.failure_url
    }

    pub fn get_logout_url(&self) -> &str {
        &self.logout_url
    }

    pub fn get_logout_success_url(&self) -> &str {
        &self.logout_success_url
    }

    /// True for the login page, the login processing URL, the logout URL,
    /// and the paths of the failure and logout success URLs.
    pub fn is_public_endpoint(&self, path: &str) -> bool {
        let path = path_of(path);
        [
            self.login_page.as_str(),
            self.login_processing_url.as_str(),
            self.logout_url.as_str(),
            path_of(&self.failure_url),
            path_of(&self.logout_success_url),
        ]
        .contains(&path)
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or_default()
}

// =============================================================================
// Login Form Data
// =============================================================================

/// Fields posted by the login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Form Login Handler
// =============================================================================

/// Processes login and logout requests against an [`AccessGate`].
///
/// Every outcome is a `302 Found`: to the saved request or default success
/// URL after a good login, to the failure URL after a bad one, and to the
/// logout success URL after logout.
#[derive(Clone)]
pub struct FormLoginHandler {
    gate: Arc<AccessGate>,
}

impl FormLoginHandler {
    pub fn new(gate: Arc<AccessGate>) -> Self {
        Self { gate }
    }

    /// Verifies the posted credentials and answers with the redirect.
    ///
    /// Password verification runs on the blocking thread pool. On success
    /// the session id the client presented, if any, is destroyed.
    pub async fn attempt_authentication(
        &self,
        req: &HttpRequest,
        form: &LoginForm,
    ) -> Result<HttpResponse, actix_web::Error> {
        let session_config = self.gate.get_session_config();
        let previous = req
            .cookie(session_config.get_cookie_name())
            .map(|c| c.value().to_string());
        let saved_request = req
            .cookie(session_config.get_saved_request_cookie_name())
            .map(|c| c.value().to_string());

        let gate = Arc::clone(&self.gate);
        let username = form.username.clone();
        let password = form.password.clone();
        let outcome = web::block(move || {
            gate.authenticate_with_saved_request(&username, &password, saved_request.as_deref())
        })
        .await?;

        Ok(match outcome {
            Ok(session) => {
                if let Some(previous) = previous {
                    self.gate.logout(&previous);
                }
                self.on_authentication_success(&session)
            }
            Err(err) => self.on_authentication_failure(err),
        })
    }

    /// Redirects to the session's originally requested path, or the default
    /// success URL, and hands out the session cookie.
    pub fn on_authentication_success(&self, session: &Session) -> HttpResponse {
        let config = self.gate.get_form_login_config();
        let session_config = self.gate.get_session_config();

        let redirect_url = match session.get_originally_requested_path() {
            Some(url) if !config.always_use_default_success_url && is_local_path(url) => url,
            _ => config.get_default_success_url(),
        };

        HttpResponse::Found()
            .insert_header((LOCATION, redirect_url))
            .cookie(session_config.session_cookie(session.get_id()))
            .cookie(session_config.removal_cookie(session_config.get_saved_request_cookie_name()))
            .finish()
    }

    /// Redirects to the failure URL.
    pub fn on_authentication_failure(&self, err: AuthError) -> HttpResponse {
        log::debug!("Login rejected: {}", err);
        HttpResponse::Found()
            .insert_header((LOCATION, self.gate.get_form_login_config().get_failure_url()))
            .finish()
    }

    /// Destroys the caller's session (if any), clears the cookie and
    /// redirects to the logout success URL.
    pub fn on_logout(&self, req: &HttpRequest) -> HttpResponse {
        let session_config = self.gate.get_session_config();
        if let Some(cookie) = req.cookie(session_config.get_cookie_name()) {
            self.gate.logout(cookie.value());
        }

        HttpResponse::Found()
            .insert_header((
                LOCATION,
                self.gate.get_form_login_config().get_logout_success_url(),
            ))
            .cookie(session_config.removal_cookie(session_config.get_cookie_name()))
            .finish()
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }
}

/// True for a path on this host: a single leading `/` not followed by
/// another `/` or a `\`. Anything else could send the browser off-site.
pub fn is_local_path(url: &str) -> bool {
    let mut chars = url.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/') | Some('\\'))
}
