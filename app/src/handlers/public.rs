//! Login and logout endpoints.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use access_gate_core::http::security::{FormLoginHandler, LoginForm};

/// Flags the login page is redirected to with (`/login?error`, `/login?logout`).
#[derive(Debug, Default, Deserialize)]
pub struct LoginPageParams {
    error: Option<String>,
    logout: Option<String>,
}

#[get("/login")]
pub async fn login_page(params: web::Query<LoginPageParams>) -> impl Responder {
    let mut notice = String::new();
    if params.error.is_some() {
        notice.push_str("    <div>Invalid username and password.</div>\n");
    }
    if params.logout.is_some() {
        notice.push_str("    <div>You have been logged out.</div>\n");
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Login</title></head>
<body>
{}    <form action="/login" method="post">
        <div><label>User Name: <input type="text" name="username"/></label></div>
        <div><label>Password: <input type="password" name="password"/></label></div>
        <div><input type="submit" value="Sign In"/></div>
    </form>
</body>
</html>"#,
        notice
    );
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    handler: web::Data<FormLoginHandler>,
) -> actix_web::Result<HttpResponse> {
    handler.attempt_authentication(&req, &form).await
}

#[post("/logout")]
pub async fn logout(req: HttpRequest, handler: web::Data<FormLoginHandler>) -> impl Responder {
    handler.on_logout(&req)
}
