use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use actix_multipart::Multipart;
use actix_web::web::{self, Bytes, BytesMut};
use chrono::Utc;
use futures::StreamExt;
use rand::Rng;

use crate::error::{self, AddCode};

/// Public URL prefix under which the upload directory is served.
pub const UPLOADS_URL: &str = "/uploads";

/// Ceiling for a multipart part that is not a file.
pub const MAX_FIELD_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

pub struct StoredFile {
    pub url: String,
    pub path: PathBuf,
    pub size: i64,
}

/// Lower-cased extension without the dot.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `bytes` under `folder` with a generated name so client file
    /// names never reach the filesystem.
    pub async fn save(
        &self,
        folder: &str,
        prefix: &str,
        extension: &str,
        bytes: Bytes,
    ) -> error::Result<StoredFile> {
        let name = format!(
            "{}-{}-{}.{}",
            prefix,
            Utc::now().timestamp_millis(),
            rand::thread_rng().gen_range(0..1_000_000_000u32),
            extension
        );

        let dir = self.root.join(folder);
        let path = dir.join(&name);
        let size = bytes.len() as i64;

        let target = path.clone();
        web::block(move || -> std::io::Result<()> {
            fs::create_dir_all(&dir)?;
            let mut file = File::create(&target)?;
            file.write_all(&bytes)?;
            Ok(())
        })
        .await??;

        let url = if folder.is_empty() {
            format!("{}/{}", UPLOADS_URL, name)
        } else {
            format!("{}/{}/{}", UPLOADS_URL, folder, name)
        };

        Ok(StoredFile { url, path, size })
    }
}

pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Default)]
pub struct MultipartForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    /// Non-empty text field.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Buffers a multipart body. Parts carrying a file name are files and may
/// not exceed `max_file_size` bytes; every other part is a text field of
/// at most `MAX_FIELD_SIZE` bytes.
pub async fn read_multipart(
    payload: Multipart,
    max_file_size: usize,
) -> error::Result<MultipartForm> {
    read_multipart_limited(payload, max_file_size, MAX_FIELD_SIZE).await
}

fn too_large(what: &str, limit: usize) -> error::ServiceError {
    if limit >= 1024 * 1024 {
        anyhow::anyhow!("{} too large. Maximum size is {} MB", what, limit / (1024 * 1024)).code(413)
    } else {
        anyhow::anyhow!("{} too large. Maximum size is {} bytes", what, limit).code(413)
    }
}

pub async fn read_multipart_limited(
    mut payload: Multipart,
    max_file_size: usize,
    max_field_size: usize,
) -> error::Result<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|err| anyhow::anyhow!("Malformed multipart body: {}", err).code(400))?;

        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|err| anyhow::anyhow!("Malformed multipart body: {}", err).code(400))?;
            data.extend_from_slice(&chunk);

            match filename {
                Some(_) if data.len() > max_file_size => {
                    return Err(too_large("File", max_file_size));
                }
                None if data.len() > max_field_size => {
                    return Err(too_large(&format!("Field {}", name), max_field_size));
                }
                _ => {}
            }
        }

        match filename {
            Some(filename) if !filename.is_empty() => form.files.push(UploadedFile {
                field: name,
                filename,
                content_type,
                bytes: data.freeze(),
            }),
            Some(_) => {}
            None => {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|_| anyhow::anyhow!("Field {} is not valid text", name).code(400))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use actix_web::{
        error::PayloadError,
        http::header::{self, HeaderMap, HeaderValue},
    };

    use super::*;

    const BOUNDARY: &str = "----storage-boundary";

    fn multipart(parts: &[(&str, Option<&str>, String)]) -> Multipart {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
        );

        Multipart::new(
            &headers,
            futures::stream::iter(vec![Ok::<_, PayloadError>(Bytes::from(body))]),
        )
    }

    #[actix_web::test]
    async fn test_fields_and_files_are_separated() {
        let payload = multipart(&[
            ("caseId", None, "CASE-1".to_string()),
            ("file", Some("route.kml"), "<kml/>".to_string()),
        ]);

        let form = read_multipart_limited(payload, 64, 64).await.unwrap();
        assert_eq!(form.field("caseId").as_deref(), Some("CASE-1"));
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].filename, "route.kml");
        assert_eq!(&form.files[0].bytes[..], b"<kml/>");
    }

    #[actix_web::test]
    async fn test_oversize_file_is_rejected() {
        let payload = multipart(&[("file", Some("route.kml"), "x".repeat(65))]);

        let err = read_multipart_limited(payload, 64, 1024).await.err().unwrap();
        assert_eq!(err.code, 413);
    }

    #[actix_web::test]
    async fn test_oversize_text_field_is_rejected() {
        let payload = multipart(&[
            ("note", None, "x".repeat(65)),
            ("file", Some("a.jpg"), "abc".to_string()),
        ]);

        let err = read_multipart_limited(payload, 1024, 64).await.err().unwrap();
        assert_eq!(err.code, 413);
        assert_eq!(err.message(), "Field note too large. Maximum size is 64 bytes");
    }
}
