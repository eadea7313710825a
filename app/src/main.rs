//! Access Gate demo server.
//!
//! `ACCESS_GATE_BIND` sets the listen address (default `127.0.0.1:8080`),
//! `RUST_LOG` the log filter (default `info`).

use std::env;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};

use access_gate_app::security::{build_gate, security_transform};
use access_gate_core::http::security::{Argon2PasswordEncoder, FormLoginHandler};

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let bind = env::var("ACCESS_GATE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let gate = Arc::new(build_gate(Argon2PasswordEncoder::new())?);

    let sweeper = Arc::clone(&gate);
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.purge_expired();
        }
    });

    log::info!("Access Gate listening on http://{}", bind);
    log::info!("Sign in as user/password to reach /hello");

    let login_handler = web::Data::new(FormLoginHandler::new(Arc::clone(&gate)));
    HttpServer::new(move || {
        App::new()
            .wrap(security_transform(&gate))
            .app_data(login_handler.clone())
            .configure(access_gate_app::configure)
    })
    .bind(bind)?
    .run()
    .await
}
