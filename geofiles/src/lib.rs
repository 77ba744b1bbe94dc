pub mod handlers;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware, web, App,
};
use common::{context::ServiceState, error::configure_extractors};

pub use crate::handlers::geofile::*;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_geofiles)
        .service(get_geofile_stats)
        .service(search_geofiles_by_location)
        .service(upload_geofile)
        .service(get_geofile)
        .service(post_geofile)
        .service(put_geofile)
        .service(delete_geofile)
        .service(post_geofile_download)
        .service(get_geofile_download)
        .service(link_geofile_case)
        .service(add_geofile_tags);
}

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    App::new()
        .wrap(Cors::permissive())
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .configure(configure_extractors)
        .configure(configure)
}
