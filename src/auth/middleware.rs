use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::warn;
use std::rc::Rc;

use crate::auth::gate::CredentialGate;
use crate::error::AppError;

/// Header carrying the bearer token on write requests.
pub const TOKEN_HEADER: &str = "X-API-Token";

/// Rejects mutating requests that do not carry a valid `X-API-Token`.
///
/// `GET`, `HEAD` and `OPTIONS` pass through untouched. Requires a
/// `web::Data<CredentialGate>` in app data.
pub struct TokenAuth;

impl<S, B> Transform<S, ServiceRequest> for TokenAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TokenAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_read_only(req.method()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match authorize(&req).await {
                Ok(()) => service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body),
                Err(app_err) => Ok(req
                    .into_response(app_err.error_response())
                    .map_into_right_body()),
            }
        })
    }
}

fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

// The digest check takes the credential lock, which token issuance holds
// across a file write, so it runs on the blocking pool.
async fn authorize(req: &ServiceRequest) -> Result<(), AppError> {
    let gate = req
        .app_data::<web::Data<CredentialGate>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Credential gate not configured".into()))?;

    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token required".into()));
    }
    if !web::block(move || gate.verify_token(&token)).await? {
        warn!("Rejected {} {}: invalid token", req.method(), req.path());
        return Err(AppError::Unauthorized("Invalid token".into()));
    }
    Ok(())
}
