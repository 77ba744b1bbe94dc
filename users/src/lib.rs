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

pub use crate::handlers::auth::*;
pub use crate::handlers::profile::*;
pub use crate::handlers::user::*;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(me)
        .service(register)
        .service(forgot_password)
        .service(reset_password)
        .service(get_users)
        .service(get_user)
        .service(post_user)
        .service(put_user)
        .service(delete_user)
        .service(get_profiles)
        .service(get_profile)
        .service(post_profile)
        .service(put_profile)
        .service(delete_profile)
        .service(my_profile)
        .service(put_my_profile);
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

    use actix_http::Request;
    use actix_web::{
        body::MessageBody,
        cookie::Cookie,
        dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
        test, App,
    };
    use common::{
        auth::SESSION_COOKIE, context::ServiceState, entities::user::User,
        repository::RepositoryObject, storage::UploadStorage,
    };
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    use crate::{create_app, service::user::ensure_admin};

    /// In-memory app with the built-in `admin`/`admin123` account.
    pub async fn create_test_app() -> App<
        impl ServiceFactory<
            ServiceRequest,
            Response = ServiceResponse<impl MessageBody>,
            Config = (),
            InitError = (),
            Error = actix_web::Error,
        >,
    > {
        let state =
            ServiceState::in_memory(UploadStorage::new(std::env::temp_dir().join("police-users")));

        let users = state
            .repositories
            .get::<RepositoryObject<User<ObjectId>>>()
            .cloned()
            .unwrap();
        ensure_admin(&users, "admin123").await.unwrap();

        create_app(Arc::new(state))
    }

    pub async fn register_user<S, B>(app: &S, username: &str, email: &str) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": username,
                "email": email,
                "password": "secret1",
                "firstName": "Test",
                "lastName": "Officer",
            }))
            .to_request();
        test::call_service(app, req).await
    }

    pub async fn login_cookie<S, B>(app: &S, username: &str, password: &str) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"username": username, "password": password}))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert!(resp.status().is_success(), "login failed for {}", username);

        resp.response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .unwrap()
            .into_owned()
    }
}
