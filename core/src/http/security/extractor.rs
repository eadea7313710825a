//! Handler access to the logged-in user.
//!
//! The security middleware puts the [`User`] of a live session into the
//! request extensions; these extractors read it back out.

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::AuthError;
use crate::http::security::user::User;

/// The logged-in user. Extraction fails with
/// [`AuthError::NotAuthenticated`] (401) when there is none.
///
/// ```ignore
/// async fn hello(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello {}!", user.get_username())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    pub fn new(user: User) -> Self {
        AuthenticatedUser(user)
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<User>()
                .cloned()
                .map(AuthenticatedUser)
                .ok_or(AuthError::NotAuthenticated),
        )
    }
}

/// The logged-in user if there is one. Never fails.
#[derive(Debug, Clone)]
pub struct OptionalUser(Option<User>);

impl OptionalUser {
    pub fn into_inner(self) -> Option<User> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalUser {
    type Target = Option<User>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUser(req.extensions().get::<User>().cloned())))
    }
}

/// Shortcuts on `HttpRequest` for the logged-in user.
pub trait SecurityExt {
    fn get_user(&self) -> Option<User>;

    fn is_authenticated(&self) -> bool;

    fn has_role(&self, role: &str) -> bool;

    fn has_any_role(&self, roles: &[&str]) -> bool;
}

impl SecurityExt for HttpRequest {
    fn get_user(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.extensions().get::<User>().is_some()
    }

    fn has_role(&self, role: &str) -> bool {
        self.extensions()
            .get::<User>()
            .is_some_and(|u| u.has_role(role))
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        self.extensions()
            .get::<User>()
            .is_some_and(|u| u.has_any_role(roles))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn user() -> User {
        User::new("user".to_string(), vec!["USER".to_string()])
    }

    #[actix_web::test]
    async fn test_authenticated_user_present() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(user());

        let extracted = AuthenticatedUser::extract(&req).await.unwrap();
        assert_eq!(extracted.get_username(), "user");
        assert!(req.is_authenticated());
        assert!(req.has_role("USER"));
        assert!(req.has_any_role(&["ADMIN", "USER"]));
        assert!(!req.has_role("ADMIN"));
    }

    #[actix_web::test]
    async fn test_authenticated_user_missing() {
        let req = TestRequest::default().to_http_request();

        let err = AuthenticatedUser::extract(&req).await.unwrap_err();
        assert_eq!(err, AuthError::NotAuthenticated);
        assert!(req.get_user().is_none());
        assert!(!req.has_any_role(&["USER"]));
    }

    #[actix_web::test]
    async fn test_optional_user() {
        let req = TestRequest::default().to_http_request();
        assert!(!OptionalUser::extract(&req).await.unwrap().is_authenticated());

        req.extensions_mut().insert(user());
        let extracted = OptionalUser::extract(&req).await.unwrap();
        assert_eq!(extracted.into_inner().unwrap().get_username(), "user");
    }
}
