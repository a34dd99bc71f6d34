//! Static registration form served at `/`.

use actix_web::{HttpResponse, get, http::header};

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// Serve the browser registration form.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Registration form")),
    tags = ["form"]
)]
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
        .body(INDEX_HTML)
}
