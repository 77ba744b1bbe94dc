use actix_web::{
    delete, get, patch, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::police_vehicle::{
    CreatePoliceVehicle, LocationChange, PoliceVehicleChange, PoliceVehicleFilter,
    PoliceVehicleService, StatusChange,
};

#[get("/api/police-vehicles")]
pub async fn get_police_vehicles(
    context: Context,
    filter: web::Query<PoliceVehicleFilter>,
) -> error::Result<HttpResponse> {
    let vehicles = PoliceVehicleService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "policeVehicles": vehicles })))
}

#[get("/api/police-vehicles/{id}")]
pub async fn get_police_vehicle(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let vehicle = PoliceVehicleService::new(context)
        .find(parse_id(&id)?)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "policeVehicle": vehicle })))
}

#[post("/api/police-vehicles")]
pub async fn post_police_vehicle(
    context: Context,
    Json(data): web::Json<CreatePoliceVehicle>,
) -> error::Result<HttpResponse> {
    let vehicle = PoliceVehicleService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "policeVehicle": vehicle })))
}

#[put("/api/police-vehicles/{id}")]
pub async fn put_police_vehicle(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<PoliceVehicleChange>,
) -> error::Result<HttpResponse> {
    let vehicle = PoliceVehicleService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "policeVehicle": vehicle })))
}

#[patch("/api/police-vehicles/{id}/location")]
pub async fn patch_police_vehicle_location(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<LocationChange>,
) -> error::Result<HttpResponse> {
    let vehicle = PoliceVehicleService::new(context)
        .change_location(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "policeVehicle": vehicle })))
}

#[patch("/api/police-vehicles/{id}/status")]
pub async fn patch_police_vehicle_status(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<StatusChange>,
) -> error::Result<HttpResponse> {
    let vehicle = PoliceVehicleService::new(context)
        .change_status(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "policeVehicle": vehicle })))
}

#[delete("/api/police-vehicles/{id}")]
pub async fn delete_police_vehicle(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    PoliceVehicleService::new(context)
        .delete(parse_id(&id)?)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Police vehicle deleted successfully" })))
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
    async fn test_vehicle_dispatch_flow() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/police-vehicles")
            .set_json(json!({"vehicleId": "PV-01", "make": "Subaru", "year": 2019}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["policeVehicle"]["status"], "available");
        let id = body["policeVehicle"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/police-vehicles/{}/location", id))
            .set_json(json!({"location": [36.8219, -1.2921]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["policeVehicle"]["location"], json!([36.8219, -1.2921]));

        let req = test::TestRequest::patch()
            .uri(&format!("/api/police-vehicles/{}/status", id))
            .set_json(json!({"status": "responding"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["policeVehicle"]["status"], "responding");

        let req = test::TestRequest::get()
            .uri("/api/police-vehicles?status=responding")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["policeVehicles"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_vehicle_patch_validation() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/police-vehicles")
            .set_json(json!({"vehicleId": "PV-02"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["policeVehicle"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/police-vehicles/{}/location", id))
            .set_json(json!({"location": [36.8]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/police-vehicles/{}/status", id))
            .set_json(json!({"status": "parked"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/police-vehicles/{}", id))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::patch()
            .uri(&format!("/api/police-vehicles/{}/status", id))
            .set_json(json!({"status": "available"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
