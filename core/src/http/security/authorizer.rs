//! Route based authorization backed by an [`AccessGate`].
//!
//! Public routes are forwarded untouched. A protected route is forwarded only
//! when the request carries a live session cookie; otherwise the configured
//! [`EntryPoint`] answers. Only GET requests for local paths are remembered
//! for the redirect after login.

use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::{Error, HttpMessage, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::http::error::AuthError;
use crate::http::security::config::Authorizer;
use crate::http::security::form_login::is_local_path;
use crate::http::security::gate::AccessGate;
use crate::http::security::route::Access;
use crate::http::security::user::User;

/// What an anonymous caller gets back from a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoint {
    /// `302 Found` to the login page, remembering GET requests.
    #[default]
    LoginRedirect,
    /// `401 Unauthorized` with the error as body.
    Unauthorized,
}

/// [`Authorizer`] that asks the gate about every request.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use access_gate_core::http::security::{
///     AccessGate, EntryPoint, GateAuthorizer, InMemoryCredentialStore,
/// };
///
/// let gate = Arc::new(AccessGate::new(InMemoryCredentialStore::new()));
/// let authorizer = GateAuthorizer::new(gate).entry_point(EntryPoint::Unauthorized);
/// assert_eq!(authorizer.get_entry_point(), EntryPoint::Unauthorized);
/// ```
#[derive(Clone)]
pub struct GateAuthorizer {
    gate: Arc<AccessGate>,
    entry_point: EntryPoint,
}

impl GateAuthorizer {
    pub fn new(gate: Arc<AccessGate>) -> Self {
        GateAuthorizer {
            gate,
            entry_point: EntryPoint::default(),
        }
    }

    pub fn entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    pub fn get_entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Lets a request through when its path is public or the authenticator
    /// already resolved a user. A session failure the authenticator recorded
    /// is reported as is; otherwise the gate looks the cookie up itself.
    fn decide(&self, req: &ServiceRequest, user: Option<&User>) -> Result<(), AuthError> {
        if user.is_some() || self.gate.classify(req.path()) == Access::Public {
            return Ok(());
        }
        if let Some(err) = req.extensions().get::<AuthError>().copied() {
            return Err(err);
        }
        let session = req.cookie(self.gate.get_session_config().get_cookie_name());
        self.gate
            .authorize(session.as_ref().map(|c| c.value()), req.path())
    }

    /// Builds the response for a request that may not proceed.
    fn reject(&self, req: &ServiceRequest, err: AuthError) -> HttpResponse {
        if self.entry_point == EntryPoint::Unauthorized {
            return err.error_response();
        }

        let session_config = self.gate.get_session_config();
        let mut response = HttpResponse::Found();
        response.insert_header((
            header::LOCATION,
            self.gate.get_form_login_config().get_login_page(),
        ));

        let url = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        if req.method() == Method::GET && is_local_path(url) {
            let existing = req.cookie(session_config.get_saved_request_cookie_name());
            let token = self
                .gate
                .save_request(existing.as_ref().map(|c| c.value()), url);
            response.cookie(session_config.saved_request_cookie(&token));
        }

        // A cookie naming a dead session is useless to the client
        if req.cookie(session_config.get_cookie_name()).is_some() {
            response.cookie(session_config.removal_cookie(session_config.get_cookie_name()));
        }

        response.finish()
    }
}

impl<B: 'static> Authorizer<B> for GateAuthorizer {
    fn process(
        &self,
        req: ServiceRequest,
        user: Option<&User>,
        next: impl FnOnce(ServiceRequest) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>
            + 'static,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        match self.decide(&req, user) {
            Ok(()) => {
                log::trace!(
                    "Access granted to {} for {}",
                    req.path(),
                    user.map_or("anonymous", |u| u.get_username())
                );
                Box::pin(async move {
                    let res = next(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                log::debug!("Access to {} denied: {}", req.path(), err);
                let response = self.reject(&req, err);
                Box::pin(async move { Ok(req.into_response(response.map_into_right_body())) })
            }
        }
    }
}
