use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};
use type_map::concurrent::TypeMap;

use crate::{
    auth::{Auth, SESSION_COOKIE},
    entities::{
        case::Case, evidence::Evidence, geofile::Geofile, license_plate::LicensePlate,
        ob_entry::ObEntry, officer::Officer, police_vehicle::PoliceVehicle, profile::Profile,
        report::Report, reset_token::ResetToken, user::User,
    },
    error::{self, AddCode, ServiceError},
    repository::{test_repository::TestRepository, Entity, RepositoryObject},
    storage::UploadStorage,
};

pub struct ServiceState {
    pub repositories: TypeMap,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            repositories: TypeMap::new(),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }

    pub fn insert_manual<T: Send + Sync + 'static>(&mut self, value: T) {
        self.repositories.insert(value);
    }

    /// Every collection backed by memory, with the same unique keys the
    /// database enforces.
    pub fn in_memory(uploads: UploadStorage) -> Self {
        let mut state = Self::new();
        state.insert::<User<ObjectId>>(memory(&["username", "email"]));
        state.insert::<Profile<ObjectId>>(memory(&[]));
        state.insert::<ResetToken>(memory(&["token"]));
        state.insert::<Case<ObjectId>>(memory(&["caseNumber"]));
        state.insert::<ObEntry<ObjectId>>(memory(&["obNumber"]));
        state.insert::<Evidence<ObjectId>>(memory(&["evidenceNumber"]));
        state.insert::<LicensePlate<ObjectId>>(memory(&["plateNumber"]));
        state.insert::<Officer<ObjectId>>(memory(&["badgeNumber"]));
        state.insert::<Report<ObjectId>>(memory(&["reportNumber"]));
        state.insert::<PoliceVehicle<ObjectId>>(memory(&[]));
        state.insert::<Geofile<ObjectId>>(memory(&[]));
        state.insert_manual(uploads);
        state
    }
}

fn memory<T>(unique: &[&str]) -> RepositoryObject<T>
where
    T: Entity + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Arc::new(TestRepository::<T>::new().with_unique(unique))
}

pub struct HandlerContext {
    pub user_auth: Auth,
}

pub struct Context(pub Arc<ServiceState>, pub HandlerContext);

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|x| x.to_str().ok())
        .and_then(|x| x.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl FromRequest for Context {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut actix_web::dev::Payload) -> Self::Future {
        fn from_request_inner(req: &HttpRequest, _payload: &mut Payload) -> error::Result<Context> {
            let user_auth = match session_token(req).map(|token| Auth::from_token(&token)) {
                Some(Ok(Some(auth))) => auth,
                Some(Ok(None)) => {
                    log::debug!("Session expired");
                    Auth::None
                }
                Some(Err(err)) => {
                    log::debug!("Ignoring session: {}", err);
                    Auth::None
                }
                None => Auth::None,
            };

            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(anyhow::anyhow!("No state provided").code(500));
            };

            Ok(Context(
                Arc::clone(state),
                HandlerContext { user_auth },
            ))
        }
        let result = from_request_inner(req, payload);

        Box::pin(async move { result })
    }
}

impl Context {
    pub fn auth(&self) -> &Auth {
        &self.1.user_auth
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.0
            .repositories
            .get::<RepositoryObject<T>>()
            .cloned()
            .ok_or(
                anyhow::anyhow!(
                    "Repository for type {} not found",
                    std::any::type_name::<T>()
                )
                .code(500),
            )
    }

    pub fn try_get_manual<T: Clone + 'static>(&self) -> error::Result<T> {
        self.0.repositories.get::<T>().cloned().ok_or(
            anyhow::anyhow!("{} is not configured", std::any::type_name::<T>()).code(500),
        )
    }
}
