use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::officer::{CreateOfficer, OfficerChange, OfficerFilter, OfficerService};

#[get("/api/officers")]
pub async fn get_officers(
    context: Context,
    filter: web::Query<OfficerFilter>,
) -> error::Result<HttpResponse> {
    let officers = OfficerService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "officers": officers })))
}

#[get("/api/officers/badge/{badge_number}")]
pub async fn get_officer_by_badge(
    context: Context,
    badge_number: web::Path<String>,
) -> error::Result<HttpResponse> {
    let officer = OfficerService::new(context)
        .find_by_badge(&badge_number)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "officer": officer })))
}

#[get("/api/officers/{id}")]
pub async fn get_officer(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let officer = OfficerService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "officer": officer })))
}

#[post("/api/officers")]
pub async fn post_officer(
    context: Context,
    Json(data): web::Json<CreateOfficer>,
) -> error::Result<HttpResponse> {
    let officer = OfficerService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "officer": officer })))
}

#[put("/api/officers/{id}")]
pub async fn put_officer(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<OfficerChange>,
) -> error::Result<HttpResponse> {
    let officer = OfficerService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "officer": officer })))
}

#[delete("/api/officers/{id}")]
pub async fn delete_officer(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    OfficerService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Officer deleted successfully" })))
}
