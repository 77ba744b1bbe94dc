use actix_web::{get, HttpResponse};
use chrono::Utc;
use serde_json::json;

#[get("/api/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "mongodb": "connected",
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        test::{self, init_service},
        App,
    };
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn test_health() {
        let app = init_service(App::new().service(health)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["mongodb"], "connected");
        assert!(body["timestamp"].is_string());
    }
}
