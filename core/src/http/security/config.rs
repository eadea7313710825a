//! The two seams of the security middleware.
//!
//! Every request first goes through an [`Authenticator`], which works out who
//! is calling, then through an [`Authorizer`], which decides whether the call
//! may proceed.

use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;

use crate::http::security::user::User;

/// Extracts the caller's identity from an HTTP request.
///
/// Returns an owned `User` so it can be stored in request extensions for
/// access by handlers.
pub trait Authenticator {
    /// Returns the user if the request carries a valid identity.
    fn get_user(&self, req: &ServiceRequest) -> Option<User>;
}

/// Decides whether a request may reach the wrapped service.
///
/// The `process` method returns a boxed future that resolves to:
/// - `EitherBody::left()` when forwarding to the inner service
/// - `EitherBody::right()` for responses produced here (redirects, 401)
pub trait Authorizer<B> {
    /// Processes the authorization decision.
    ///
    /// # Arguments
    /// * `req` - The incoming request
    /// * `user` - The authenticated user (if any)
    /// * `next` - Closure to call the next service in the chain
    fn process(
        &self,
        req: ServiceRequest,
        user: Option<&User>,
        next: impl FnOnce(ServiceRequest) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>
            + 'static,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>;
}
