use actix_web::{get, HttpResponse, Responder};

/// Health check endpoint
///
/// Always answers with a plain-text `OK`.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}
