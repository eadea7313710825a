//! Route handlers, one module per page.

pub mod hello;
pub mod home;
pub mod public;
