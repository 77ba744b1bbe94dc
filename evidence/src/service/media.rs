use actix_multipart::Multipart;
use chrono::Utc;
use common::{
    context::Context,
    entities::evidence::MediaType,
    error::{self, bad_request},
    storage::{extension, read_multipart, UploadStorage, UploadedFile},
};
use serde::Serialize;

pub const MEDIA_FIELD: &str = "media";
pub const MAX_MEDIA_SIZE: usize = 10 * 1024 * 1024;
pub const MEDIA_EXTENSIONS: [&str; 10] = [
    "jpeg", "jpg", "png", "gif", "mp4", "avi", "mov", "pdf", "doc", "docx",
];

/// A stored upload, shaped so it can be attached to evidence as is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub name: String,
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub size: i64,
    pub uploaded_at: i64,
    pub uploaded_by: Option<String>,
}

/// Content type wins; files sent without one are classified by extension.
pub fn media_type(content_type: Option<&str>, extension: &str) -> MediaType {
    match content_type {
        Some(mime) if mime.starts_with("image/") => MediaType::Photo,
        Some(mime) if mime.starts_with("video/") => MediaType::Video,
        Some(mime) if mime.starts_with("audio/") => MediaType::Audio,
        Some(mime) if mime != "application/octet-stream" => MediaType::Document,
        _ => match extension {
            "jpeg" | "jpg" | "png" | "gif" => MediaType::Photo,
            "mp4" | "avi" | "mov" => MediaType::Video,
            _ => MediaType::Document,
        },
    }
}

fn media_extension(file: &UploadedFile) -> error::Result<String> {
    match extension(&file.filename) {
        Some(ext) if MEDIA_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(bad_request(format!(
            "Invalid file type: {}. Allowed types: {}",
            file.filename,
            MEDIA_EXTENSIONS.join(", ")
        ))),
    }
}

pub struct MediaService {
    context: Context,
}

impl MediaService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn upload(&self, payload: Multipart) -> error::Result<Vec<UploadedMedia>> {
        let form = read_multipart(payload, MAX_MEDIA_SIZE).await?;

        let files: Vec<UploadedFile> = form
            .files
            .into_iter()
            .filter(|file| file.field == MEDIA_FIELD)
            .collect();
        if files.is_empty() {
            return Err(bad_request("No files uploaded"));
        }

        let extensions = files
            .iter()
            .map(media_extension)
            .collect::<error::Result<Vec<_>>>()?;

        let storage = self.context.try_get_manual::<UploadStorage>()?;
        let uploaded_by = self.context.auth().session().map(|session| session.full_name());

        let mut uploaded = Vec::with_capacity(files.len());
        for (file, ext) in files.into_iter().zip(extensions) {
            let kind = media_type(file.content_type.as_deref(), &ext);
            let stored = storage.save("", MEDIA_FIELD, &ext, file.bytes).await?;

            let filename = stored
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            log::info!("Stored media {} as {}", file.filename, filename);

            uploaded.push(UploadedMedia {
                name: file.filename,
                filename,
                url: stored.url,
                kind,
                size: stored.size,
                uploaded_at: Utc::now().timestamp_micros(),
                uploaded_by: uploaded_by.clone(),
            });
        }

        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_prefers_content_type() {
        assert_eq!(media_type(Some("image/png"), "pdf"), MediaType::Photo);
        assert_eq!(media_type(Some("audio/mpeg"), "mp4"), MediaType::Audio);
        assert_eq!(media_type(Some("application/pdf"), "jpg"), MediaType::Document);
        assert_eq!(media_type(None, "mov"), MediaType::Video);
        assert_eq!(
            media_type(Some("application/octet-stream"), "gif"),
            MediaType::Photo
        );
    }
}
