use crate::{
    auth::{CredentialGate, TokenRequest, TokenResponse, TOKEN_ISSUED_MESSAGE},
    error::AppError,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use log::warn;
use serde_json::json;

/// Issue an API token
///
/// Verifies the master password and returns a freshly generated token. The
/// token's digest is stored; the token itself is only ever in this response.
///
/// ## Responses:
/// - `201 Created`: `{"token": ..., "message": ...}`.
/// - `400 Bad Request`: malformed JSON body.
/// - `401 Unauthorized`: missing or wrong password.
/// - `500 Internal Server Error`: the random source or the config file write failed.
#[post("/token")]
pub async fn issue_token(
    gate: web::Data<CredentialGate>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    if body.password.is_empty() {
        return Err(AppError::Unauthorized("Password required".into()));
    }
    let password = body.into_inner().password;
    let checker = gate.clone();
    if !web::block(move || checker.verify_password(&password)).await? {
        warn!("Token request rejected: invalid password");
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let token = web::block(move || gate.issue_token()).await??;

    Ok(HttpResponse::Created().json(TokenResponse {
        token,
        message: TOKEN_ISSUED_MESSAGE.to_string(),
    }))
}

/// Legacy configuration endpoint kept for older web clients.
#[get("/api/config")]
pub async fn legacy_config() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Use token-based authentication"
    }))
}
