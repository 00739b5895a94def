use actix_files::{Files, NamedFile};
use actix_web::{get, web};
use log::debug;
use std::path::PathBuf;

use crate::error::AppError;

/// Directory the web UI is served from.
#[derive(Debug, Clone)]
pub struct UiRoot(PathBuf);

/// Registers `GET /` (the UI's `index.html`) and the `/static` asset tree,
/// both served from `static_dir`.
pub fn config(static_dir: impl Into<PathBuf>) -> impl FnOnce(&mut web::ServiceConfig) {
    let static_dir = static_dir.into();
    move |cfg| {
        cfg.app_data(web::Data::new(UiRoot(static_dir.clone())))
            .service(index)
            .service(Files::new("/static", static_dir));
    }
}

/// Serves the web UI.
///
/// ## Responses:
/// - `200 OK`: `index.html`.
/// - `404 Not Found`: the UI is not installed.
#[get("/")]
pub async fn index(root: web::Data<UiRoot>) -> Result<NamedFile, AppError> {
    let path = root.0.join("index.html");
    NamedFile::open_async(&path).await.map_err(|err| {
        debug!("Cannot serve {}: {}", path.display(), err);
        AppError::NotFound("Not found".into())
    })
}
