mod health;
mod seed;
mod state;

use std::{fs, sync::Arc};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use common::{config::Config, error::configure_extractors, storage::UPLOADS_URL};

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(startup_error)?;
    fs::create_dir_all(&config.upload_dir)?;

    let database = state::connect(&config).await.map_err(startup_error)?;
    let state = Arc::new(
        state::build_state(&database, &config)
            .await
            .map_err(startup_error)?,
    );

    seed::seed(&state).await;

    let upload_dir = config.upload_dir.clone();
    log::info!("Listening on 0.0.0.0:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure_extractors)
            .service(health::health)
            .configure(users::configure)
            .configure(records::configure)
            .configure(evidence::configure)
            .configure(geofiles::configure)
            .service(Files::new(UPLOADS_URL, upload_dir.clone()))
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
