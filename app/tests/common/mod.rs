//! Shared test setup: the demo app behind a gate whose password hashes are
//! stored in plain text, so logins stay fast.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};

use access_gate_app::security::{build_gate, security_transform};
use access_gate_core::http::security::{AccessGate, FormLoginHandler, NoOpPasswordEncoder, PasswordEncoder};

pub const SESSION_COOKIE: &str = "GATE_SESSION";
pub const SAVED_REQUEST_COOKIE: &str = "GATE_SAVED_REQUEST";

pub fn test_gate() -> Arc<AccessGate> {
    test_gate_with(NoOpPasswordEncoder)
}

pub fn test_gate_with<E: PasswordEncoder + 'static>(encoder: E) -> Arc<AccessGate> {
    Arc::new(build_gate(encoder).unwrap())
}

pub async fn create_test_app(
    gate: &Arc<AccessGate>,
) -> impl Service<actix_http::Request, Response = ServiceResponse<EitherBody<BoxBody>>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .wrap(security_transform(gate))
            .app_data(web::Data::new(FormLoginHandler::new(Arc::clone(gate))))
            .configure(access_gate_app::configure),
    )
    .await
}

/// The named cookie set by a response, if any.
pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_string<B: actix_web::body::MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8_lossy(&test::read_body(resp).await).to_string()
}
