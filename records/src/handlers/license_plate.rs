use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::license_plate::{
    CreateLicensePlate, LicensePlateChange, LicensePlateFilter, LicensePlateService,
};

#[get("/api/license-plates")]
pub async fn get_license_plates(
    context: Context,
    filter: web::Query<LicensePlateFilter>,
) -> error::Result<HttpResponse> {
    let plates = LicensePlateService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "licensePlates": plates })))
}

#[get("/api/license-plates/search/{plate_number}")]
pub async fn search_license_plate(
    context: Context,
    plate_number: web::Path<String>,
) -> error::Result<HttpResponse> {
    let plate = LicensePlateService::new(context)
        .search(&plate_number)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "licensePlate": plate })))
}

#[get("/api/license-plates/{id}")]
pub async fn get_license_plate(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let plate = LicensePlateService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "licensePlate": plate })))
}

#[post("/api/license-plates")]
pub async fn post_license_plate(
    context: Context,
    Json(data): web::Json<CreateLicensePlate>,
) -> error::Result<HttpResponse> {
    let plate = LicensePlateService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "licensePlate": plate })))
}

#[put("/api/license-plates/{id}")]
pub async fn put_license_plate(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<LicensePlateChange>,
) -> error::Result<HttpResponse> {
    let plate = LicensePlateService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "licensePlate": plate })))
}

#[delete("/api/license-plates/{id}")]
pub async fn delete_license_plate(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    LicensePlateService::new(context)
        .delete(parse_id(&id)?)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "License plate deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, init_service},
    };
    use serde_json::{json, Value};

    use crate::tests::create_test_app;

    #[actix_web::test]
    async fn test_plate_registration_and_search() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/license-plates")
            .set_json(json!({
                "plateNumber": "KAA 123B",
                "ownerName": "Grace Wanjiru",
                "vehicleModel": "Toyota Probox",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["licensePlate"]["status"], "Active");

        let req = test::TestRequest::get()
            .uri("/api/license-plates/search/kaa%20123b")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["licensePlate"]["ownerName"], "Grace Wanjiru");

        let req = test::TestRequest::get()
            .uri("/api/license-plates/search/KBB%20999Z")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_duplicate_plate_conflicts() {
        let app = init_service(create_test_app()).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/license-plates")
                .set_json(json!({"plateNumber": "KCD 456X"}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }

        let req = test::TestRequest::post()
            .uri("/api/license-plates")
            .set_json(json!({"ownerName": "No plate"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_plate_status_filter_and_update() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/license-plates")
            .set_json(json!({"plateNumber": "KDE 789Y"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["licensePlate"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/license-plates/{}", id))
            .set_json(json!({"status": "Suspended"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["licensePlate"]["status"], "Suspended");

        let req = test::TestRequest::get()
            .uri("/api/license-plates?status=Suspended")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["licensePlates"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/license-plates?status=Active")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["licensePlates"].as_array().unwrap().is_empty());
    }
}
