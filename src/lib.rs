#![doc = "The `taskmate` library crate."]
#![doc = ""]
#![doc = "This crate contains the task store and its JSON persistence, the credential"]
#![doc = "gate that issues and checks API tokens, configuration loading, routing and"]
#![doc = "error handling for the TaskMate service. It is used by the main binary"]
#![doc = "(`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
pub mod store;

pub use auth::CredentialGate;
pub use config::Config;
pub use error::AppError;
pub use store::TaskStore;
