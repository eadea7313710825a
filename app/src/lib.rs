//! Access Gate demo application.
//!
//! Three pages behind the gate: a public welcome page at `/` and `/home`,
//! a login page, and a protected greeting at `/hello`. One account exists,
//! `user` / `password` with role `USER`.

pub mod handlers;
pub mod security;

use actix_web::web;

/// Registers every route of the demo application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/", "/home"]).route(web::get().to(handlers::home::home)))
        .service(handlers::public::login_page)
        .service(handlers::public::login)
        .service(handlers::public::logout)
        .service(handlers::hello::hello);
}
