use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::report::{CreateReport, ReportChange, ReportService};

#[get("/api/reports")]
pub async fn get_reports(context: Context) -> error::Result<HttpResponse> {
    let reports = ReportService::new(context).find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "reports": reports })))
}

#[get("/api/reports/{id}")]
pub async fn get_report(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let report = ReportService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "report": report })))
}

#[post("/api/reports")]
pub async fn post_report(
    context: Context,
    Json(data): web::Json<CreateReport>,
) -> error::Result<HttpResponse> {
    let report = ReportService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "report": report })))
}

#[put("/api/reports/{id}")]
pub async fn put_report(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<ReportChange>,
) -> error::Result<HttpResponse> {
    let report = ReportService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "report": report })))
}

#[delete("/api/reports/{id}")]
pub async fn delete_report(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    ReportService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Report deleted successfully" })))
}
