use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::time::Duration;

use taskmate::{routes, Config, CredentialGate, TaskStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const KEEP_ALIVE: Duration = Duration::from_secs(60);

fn print_banner(config: &Config, store: &TaskStore) {
    let url = config.server_url();
    info!("TaskMate API server starting on {}", url);
    info!("Data file: {} ({} tasks)", store.path().display(), store.len());
    info!("Config file: {}", config.config_path.display());
    info!("Web UI: {}/ (from {})", url, config.static_dir.display());
    info!("Health check: {}/health", url);
    info!("API base URL: {}/api/v1", url);
    info!("  POST   /api/v1/auth/token     - Generate token (requires password)");
    info!("  GET    /api/v1/tasks          - List all tasks (no auth)");
    info!("  GET    /api/v1/tasks/pending  - List pending tasks (no auth)");
    info!("  GET    /api/v1/tasks/{{id}}     - Get task (no auth)");
    info!("  POST   /api/v1/tasks          - Create task (requires token)");
    info!("  PUT    /api/v1/tasks/{{id}}     - Update task (requires token)");
    info!("  DELETE /api/v1/tasks/{{id}}     - Delete task (requires token)");
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let store = web::Data::new(TaskStore::open(&config.data_file));
    let gate = web::Data::new(CredentialGate::new(
        &config.config_path,
        config.stored.clone(),
    ));

    print_banner(&config, &store);
    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(gate.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
            .configure(routes::ui::config(static_dir.clone()))
    })
    .client_request_timeout(REQUEST_TIMEOUT)
    .keep_alive(KEEP_ALIVE)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
