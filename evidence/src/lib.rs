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

pub use crate::handlers::evidence::*;
pub use crate::handlers::media::*;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_evidence_list)
        .service(get_evidence_stats)
        .service(get_evidence_by_case)
        .service(get_evidence_by_ob)
        .service(get_evidence)
        .service(post_evidence)
        .service(put_evidence)
        .service(post_custody_entry)
        .service(post_evidence_media)
        .service(delete_evidence)
        .service(upload_media);
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
