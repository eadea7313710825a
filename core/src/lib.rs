//! # Access Gate Core
//!
//! Session-based access control for Actix Web: route rules decide which paths
//! are public, a form login issues server-side sessions, and a middleware sends
//! anonymous clients to the login page and back to where they were heading.
//!
//! The main functionality is available through the `http` module:
//!
//! - [`http::security`] - Gate, middleware, extractors and form login
//! - [`http::error`] - Error types

pub mod http;
