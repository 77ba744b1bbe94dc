use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::evidence::{
    CreateEvidence, EvidenceChange, EvidenceFilter, EvidenceService, NewCustodyEntry, NewMedia,
};

#[get("/api/evidence")]
pub async fn get_evidence_list(
    context: Context,
    filter: web::Query<EvidenceFilter>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[get("/api/evidence/stats")]
pub async fn get_evidence_stats(context: Context) -> error::Result<HttpResponse> {
    let stats = EvidenceService::new(context).stats().await?;
    Ok(HttpResponse::Ok().json(json!({ "stats": stats })))
}

#[get("/api/evidence/case/{case_id}")]
pub async fn get_evidence_by_case(
    context: Context,
    case_id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context).find_by_case(&case_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[get("/api/evidence/ob/{ob_id}")]
pub async fn get_evidence_by_ob(
    context: Context,
    ob_id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context).find_by_ob(&ob_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[get("/api/evidence/{id}")]
pub async fn get_evidence(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[post("/api/evidence")]
pub async fn post_evidence(
    context: Context,
    Json(data): web::Json<CreateEvidence>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context).create(data).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "evidence": evidence,
        "message": "Evidence created successfully",
    })))
}

#[put("/api/evidence/{id}")]
pub async fn put_evidence(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<EvidenceChange>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[post("/api/evidence/{id}/custody")]
pub async fn post_custody_entry(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<NewCustodyEntry>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context)
        .add_custody_entry(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[post("/api/evidence/{id}/media")]
pub async fn post_evidence_media(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<NewMedia>,
) -> error::Result<HttpResponse> {
    let evidence = EvidenceService::new(context)
        .add_media(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "evidence": evidence })))
}

#[delete("/api/evidence/{id}")]
pub async fn delete_evidence(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    EvidenceService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Evidence deleted successfully" })))
}
