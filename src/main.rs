use std::io;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use employee_manager::config::Settings;
use employee_manager::db::Database;
use employee_manager::{configure_app, utils, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let settings = Settings::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    utils::logger::init(&settings.role_name, &settings.env);

    let db = Database::connect(&settings)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    db.migrate()
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let (host, port) = settings.bind_address();
    info!(
        "Starting {} ({}) at {}:{}",
        settings.role_name, settings.env, host, port
    );

    let state = web::Data::new(AppState::new(settings, db));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure_app(state.clone()))
    })
    .bind((host, port))?
    .run()
    .await
}
