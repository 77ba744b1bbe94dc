use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    web, HttpRequest, HttpResponse, ResponseError,
};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display)]
#[display(fmt = "{}", err)]
pub struct ServiceError {
    pub code: u16,
    pub err: anyhow::Error,
}

impl ServiceError {
    pub fn message(&self) -> String {
        self.err.to_string()
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = if status.is_server_error() {
            log::error!("{}: {:?}", status, self.err);
            "Internal server error".to_string()
        } else {
            log::warn!("{}: {}", status, self.err);
            self.message()
        };

        HttpResponse::build(status).json(json!({ "message": message }))
    }
}

impl<E: Into<anyhow::Error>> From<E> for ServiceError {
    fn from(err: E) -> ServiceError {
        ServiceError {
            code: 500,
            err: err.into(),
        }
    }
}

pub trait AddCode {
    fn code(self, code: u16) -> ServiceError;
}

impl AddCode for anyhow::Error {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { code, err: self }
    }
}

impl AddCode for ServiceError {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { code, err: self.err }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

pub fn not_found(what: &str) -> ServiceError {
    anyhow::anyhow!("{} not found", what).code(404)
}

pub fn bad_request(message: impl std::fmt::Display) -> ServiceError {
    anyhow::anyhow!("{}", message).code(400)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("Invalid request body: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("Invalid query: {}", err)).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("Invalid path: {}", err)).into()
}

/// Extractor settings that report malformed input as `400 {"message"}`.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}
