pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod utils;

use actix_web::web;

use crate::config::Settings;
use crate::db::Database;
use crate::errors::AppError;
use crate::repository::employee::EmployeeRepository;

pub const API_PREFIX: &str = "/api/v1";

pub struct AppState {
    pub settings: Settings,
    pub db: Database,
    pub employees: EmployeeRepository,
}

impl AppState {
    pub fn new(settings: Settings, db: Database) -> Self {
        AppState {
            settings,
            db,
            employees: EmployeeRepository::new(),
        }
    }
}

/// Registers state, extractor error handling and all routes.
pub fn configure_app(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state)
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
            )
            .service(web::scope(API_PREFIX).configure(handlers::employee::configure));
        handlers::docs::configure(cfg);
    }
}
