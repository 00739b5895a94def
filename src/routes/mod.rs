pub mod auth;
pub mod health;
pub mod tasks;
pub mod ui;

use actix_web::{error, web, HttpRequest};
use log::debug;

use crate::auth::TokenAuth;
use crate::error::AppError;

/// Registers every route plus the JSON and path extractor settings.
///
/// Expects `web::Data<TaskStore>` and `web::Data<CredentialGate>` to be
/// registered on the app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(auth::legacy_config)
        .service(
            web::scope("/api/v1")
                .service(web::scope("/auth").service(auth::issue_token))
                .service(
                    web::scope("/tasks")
                        .wrap(TokenAuth)
                        .service(tasks::list_tasks)
                        .service(tasks::list_pending_tasks)
                        .service(tasks::get_task)
                        .service(tasks::create_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, req: &HttpRequest| {
        debug!("Rejected body for {} {}: {}", req.method(), req.path(), err);
        AppError::BadRequest("Invalid JSON".into()).into()
    })
}

// Every path parameter in the API is a task ID.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, req: &HttpRequest| {
        debug!("Rejected path {}: {}", req.path(), err);
        AppError::BadRequest("Invalid task ID".into()).into()
    })
}
