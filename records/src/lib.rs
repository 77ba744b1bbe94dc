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

pub use crate::handlers::case::*;
pub use crate::handlers::license_plate::*;
pub use crate::handlers::ob_entry::*;
pub use crate::handlers::officer::*;
pub use crate::handlers::police_vehicle::*;
pub use crate::handlers::report::*;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_cases)
        .service(get_case)
        .service(post_case)
        .service(put_case)
        .service(delete_case)
        .service(get_ob_entries)
        .service(get_ob_entry)
        .service(post_ob_entry)
        .service(put_ob_entry)
        .service(delete_ob_entry)
        .service(get_license_plates)
        .service(search_license_plate)
        .service(get_license_plate)
        .service(post_license_plate)
        .service(put_license_plate)
        .service(delete_license_plate)
        .service(get_officers)
        .service(get_officer_by_badge)
        .service(get_officer)
        .service(post_officer)
        .service(put_officer)
        .service(delete_officer)
        .service(get_reports)
        .service(get_report)
        .service(post_report)
        .service(put_report)
        .service(delete_report)
        .service(get_police_vehicles)
        .service(get_police_vehicle)
        .service(post_police_vehicle)
        .service(put_police_vehicle)
        .service(patch_police_vehicle_location)
        .service(patch_police_vehicle_status)
        .service(delete_police_vehicle);
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

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use actix_web::{
        body::MessageBody,
        dev::{ServiceFactory, ServiceRequest, ServiceResponse},
        App,
    };
    use common::{
        auth::{Auth, Session},
        context::ServiceState,
        entities::role::Role,
        storage::UploadStorage,
    };
    use mongodb::bson::oid::ObjectId;

    use crate::create_app;

    pub fn create_test_app() -> App<
        impl ServiceFactory<
            ServiceRequest,
            Response = ServiceResponse<impl MessageBody>,
            Config = (),
            InitError = (),
            Error = actix_web::Error,
        >,
    > {
        create_app(Arc::new(ServiceState::in_memory(UploadStorage::new(
            std::env::temp_dir().join("police-records"),
        ))))
    }

    /// `Authorization` header carrying a fresh session, and the session itself.
    pub fn bearer(admin: bool) -> ((&'static str, String), Session) {
        let session = Session {
            id: ObjectId::new().to_hex(),
            username: "dsmith".to_string(),
            role: if admin { Role::Admin } else { Role::User },
            first_name: "Dana".to_string(),
            last_name: "Smith".to_string(),
        };
        let token = Auth::from_session(session.clone()).to_token().unwrap();

        (("Authorization", format!("Bearer {}", token)), session)
    }
}
