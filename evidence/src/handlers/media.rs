use actix_multipart::Multipart;
use actix_web::{post, HttpResponse};
use common::{context::Context, error};
use serde_json::json;

use crate::service::media::MediaService;

#[post("/api/upload-media")]
pub async fn upload_media(context: Context, payload: Multipart) -> error::Result<HttpResponse> {
    let files = MediaService::new(context).upload(payload).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("{} file(s) uploaded successfully", files.len()),
        "files": files,
    })))
}
