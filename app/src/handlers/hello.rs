//! Greeting page, only reachable with a session.

use actix_web::{get, HttpResponse, Responder};

use access_gate_core::http::security::AuthenticatedUser;

#[get("/hello")]
pub async fn hello(user: AuthenticatedUser) -> impl Responder {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Hello</title></head>
<body>
    <h1>Hello {}!</h1>
    <form action="/logout" method="post">
        <input type="submit" value="Sign Out"/>
    </form>
</body>
</html>"#,
        user.get_username()
    );
    HttpResponse::Ok().content_type("text/html").body(html)
}
