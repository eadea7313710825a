use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Failures reported by the access gate.
///
/// None of these are fatal: they surface at the request boundary as a
/// redirect to the login page or a `401 Unauthorized`.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong password at login.
    #[display("invalid credentials")]
    InvalidCredentials,
    /// Protected path requested without a live session.
    #[display("not authenticated")]
    NotAuthenticated,
    /// The session existed but sat idle past its timeout.
    #[display("session expired")]
    SessionExpired,
}

impl error::ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code()).body(self.to_string())
    }
}
