//! Session-based access control.
//!
//! # Module Structure
//!
//! - `gate` - [`AccessGate`]: classify, authenticate, authorize, logout
//! - `route` - Public/protected route rules
//! - `ant_matcher` - Ant-style URL pattern matching
//! - `session` - Server-side session store and cookie settings
//! - `authenticator` - Credential lookup and the session cookie authenticator
//! - `authorizer` - Gate-backed authorizer and entry points
//! - `config` - Core traits (Authenticator, Authorizer)
//! - `crypto` - Password encoding (Argon2, NoOp)
//! - `form_login` - Login/logout form processing
//! - `extractor` - Actix Web extractors (AuthenticatedUser, OptionalUser)
//! - `manager` - Factory methods (AuthenticationManager, AuthorizationManager)
//! - `middleware` - Security middleware (SecurityTransform)
//! - `user` - Credential and user model

pub use authenticator::{CredentialLookup, InMemoryCredentialStore, SessionAuthenticator};
pub use authorizer::{EntryPoint, GateAuthorizer};
pub use config::{Authenticator, Authorizer};
pub use crypto::{Argon2PasswordEncoder, EncodingError, NoOpPasswordEncoder, PasswordEncoder};
pub use extractor::{AuthenticatedUser, OptionalUser, SecurityExt};
pub use form_login::{FormLoginConfig, FormLoginHandler, LoginForm};
pub use gate::AccessGate;
pub use manager::{AuthenticationManager, AuthorizationManager};
pub use middleware::{SecurityService, SecurityTransform};
pub use route::{Access, RouteRule, RouteRules};
pub use session::{Session, SessionConfig, SessionStore};
pub use user::{Credential, User};

pub use crate::http::error::AuthError;

pub mod ant_matcher;
pub mod authenticator;
pub mod authorizer;
pub mod config;
pub mod crypto;
pub mod extractor;
pub mod form_login;
pub mod gate;
pub mod manager;
pub mod middleware;
pub mod route;
pub mod session;
pub mod user;
