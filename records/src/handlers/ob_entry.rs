use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::ob_entry::{CreateObEntry, ObEntryChange, ObEntryFilter, ObEntryService};

#[get("/api/ob-entries")]
pub async fn get_ob_entries(
    context: Context,
    filter: web::Query<ObEntryFilter>,
) -> error::Result<HttpResponse> {
    let entries = ObEntryService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "obEntries": entries })))
}

#[get("/api/ob-entries/{id}")]
pub async fn get_ob_entry(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let entry = ObEntryService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "obEntry": entry })))
}

#[post("/api/ob-entries")]
pub async fn post_ob_entry(
    context: Context,
    Json(data): web::Json<CreateObEntry>,
) -> error::Result<HttpResponse> {
    let entry = ObEntryService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "obEntry": entry })))
}

#[put("/api/ob-entries/{id}")]
pub async fn put_ob_entry(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<ObEntryChange>,
) -> error::Result<HttpResponse> {
    let entry = ObEntryService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "obEntry": entry })))
}

#[delete("/api/ob-entries/{id}")]
pub async fn delete_ob_entry(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    ObEntryService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "OB entry deleted successfully" })))
}
