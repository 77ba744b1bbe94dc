use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::case::{CaseChange, CaseFilter, CaseService, CreateCase};

#[get("/api/cases")]
pub async fn get_cases(
    context: Context,
    filter: web::Query<CaseFilter>,
) -> error::Result<HttpResponse> {
    let cases = CaseService::new(context).find_all(filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "cases": cases })))
}

#[get("/api/cases/{id}")]
pub async fn get_case(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let case = CaseService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "case": case })))
}

#[post("/api/cases")]
pub async fn post_case(
    context: Context,
    Json(data): web::Json<CreateCase>,
) -> error::Result<HttpResponse> {
    let case = CaseService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "case": case })))
}

#[put("/api/cases/{id}")]
pub async fn put_case(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<CaseChange>,
) -> error::Result<HttpResponse> {
    let case = CaseService::new(context).change(parse_id(&id)?, data).await?;
    Ok(HttpResponse::Ok().json(json!({ "case": case })))
}

#[delete("/api/cases/{id}")]
pub async fn delete_case(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    CaseService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Case deleted successfully" })))
}
