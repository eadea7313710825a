//! Entry points for building the two halves of the gate's configuration.

use crate::http::security::authenticator::InMemoryCredentialStore;
use crate::http::security::route::RouteRules;

pub struct AuthenticationManager {}

impl AuthenticationManager {
    pub fn in_memory_authentication() -> InMemoryCredentialStore {
        InMemoryCredentialStore::new()
    }
}

pub struct AuthorizationManager {}

impl AuthorizationManager {
    pub fn route_rules() -> RouteRules {
        RouteRules::new()
    }
}
