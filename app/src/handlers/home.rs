//! Welcome page, public.

use actix_web::{HttpResponse, Responder};

pub async fn home() -> impl Responder {
    HttpResponse::Ok().content_type("text/html").body(
        r#"<!DOCTYPE html>
<html>
<head><title>Access Gate</title></head>
<body>
    <h1>Welcome!</h1>
    <p>Click <a href="/hello">here</a> to see a greeting.</p>
</body>
</html>"#,
    )
}
