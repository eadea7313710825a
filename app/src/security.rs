//! Gate wiring: the single account and the route rules.

use std::io;
use std::sync::Arc;

use access_gate_core::http::security::{
    AccessGate, AuthenticationManager, AuthorizationManager, Credential, GateAuthorizer,
    PasswordEncoder, SecurityTransform, SessionAuthenticator,
};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "password";

/// Builds the gate: `/` and `/home` public, everything else protected, and
/// one `USER` account whose password is hashed with `encoder`.
pub fn build_gate<E: PasswordEncoder + 'static>(encoder: E) -> io::Result<AccessGate> {
    let password_hash = encoder
        .encode(PASSWORD)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let credentials = AuthenticationManager::in_memory_authentication().with_user(
        Credential::with_encoded_password(USERNAME, password_hash).roles(&["USER"]),
    );
    let rules = AuthorizationManager::route_rules().permit_all(&["/", "/home"]);

    Ok(AccessGate::new(credentials)
        .password_encoder(encoder)
        .route_rules(rules))
}

/// The middleware guarding every route of the app.
pub fn security_transform(
    gate: &Arc<AccessGate>,
) -> SecurityTransform<SessionAuthenticator, GateAuthorizer> {
    SecurityTransform::new()
        .config_authenticator(SessionAuthenticator::new(Arc::clone(gate)))
        .config_authorizer(GateAuthorizer::new(Arc::clone(gate)))
}
