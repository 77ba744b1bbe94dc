use std::collections::HashMap;

use actix_multipart::Multipart;
use chrono::Utc;
use common::{
    context::Context,
    entities::geofile::{
        default_coordinate_system, empty_metadata, parse_file_type, AccessLevel, Geofile,
        GEOFILE_TYPES,
    },
    error::{self, bad_request, not_found},
    lenient,
    query::{change_set, contains, created_between, equals_ignore_case, present},
    storage::{extension, read_multipart, UploadStorage},
};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::location::{within, DEFAULT_RADIUS_METERS};

pub const GEOFILES_FOLDER: &str = "geofiles";
pub const MAX_GEOFILE_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeofile {
    pub filename: Option<String>,
    pub filepath: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub coordinates: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub bounding_box: Option<Vec<Vec<f64>>>,
    pub address: Option<String>,
    pub location_name: Option<String>,
    pub description: Option<String>,
    #[serde(default = "empty_metadata", deserialize_with = "lenient::json_object")]
    pub metadata: Value,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    pub coordinate_system: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub is_public: Option<bool>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofileChange {
    pub filename: Option<String>,
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub coordinates: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub bounding_box: Option<Vec<Vec<f64>>>,
    pub address: Option<String>,
    pub location_name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "lenient::optional_string_list")]
    pub tags: Option<Vec<String>>,
    pub coordinate_system: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub is_public: Option<bool>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofileFilter {
    pub search: Option<String>,
    pub file_type: Option<String>,
    pub access_level: Option<String>,
    pub tags: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTags {
    #[serde(default)]
    pub tags: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    pub download_url: Option<String>,
    pub filename: String,
    pub file_type: String,
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofileStats {
    pub total: u64,
    pub by_file_type: HashMap<String, u64>,
    pub by_access_level: HashMap<AccessLevel, u64>,
    pub total_downloads: i64,
}

pub fn build_query(filter: GeofileFilter) -> error::Result<Document> {
    let mut query = Document::new();

    if let Some(search) = present(filter.search) {
        let term = contains(&search);
        query.insert(
            "$or",
            vec![
                doc! {"filename": term.clone()},
                doc! {"description": term.clone()},
                doc! {"address": term.clone()},
                doc! {"locationName": term},
            ],
        );
    }

    if let Some(file_type) = present(filter.file_type) {
        query.insert("fileType", equals_ignore_case(&file_type));
    }

    if let Some(access_level) = present(filter.access_level) {
        query.insert("accessLevel", access_level);
    }

    let tags = filter
        .tags
        .as_deref()
        .map(lenient::split_list)
        .unwrap_or_default();
    if !tags.is_empty() {
        query.insert("tags", doc! {"$in": tags});
    }

    if let Some(range) = created_between(filter.date_from.as_deref(), filter.date_to.as_deref())? {
        query.insert("createdAt", range);
    }

    Ok(query)
}

pub struct GeofileService {
    context: Context,
}

impl GeofileService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self, filter: GeofileFilter) -> error::Result<Vec<Geofile<String>>> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        Ok(geofiles
            .query(build_query(filter)?)
            .await?
            .into_iter()
            .map(Geofile::stringify)
            .collect())
    }

    /// Reading a geofile counts as an access.
    pub async fn find(&self, id: ObjectId) -> error::Result<Geofile<String>> {
        self.update_access(id).await
    }

    pub async fn update_access(&self, id: ObjectId) -> error::Result<Geofile<String>> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let update = doc! {"$set": {"lastAccessedAt": Utc::now().timestamp_micros()}};
        let Some(geofile) = geofiles.update(&id, update).await? else {
            return Err(not_found("Geofile"));
        };

        Ok(geofile.stringify())
    }

    pub async fn create(&self, data: CreateGeofile) -> error::Result<Geofile<String>> {
        let (Some(filename), Some(file_type)) = (present(data.filename), present(data.file_type))
        else {
            return Err(bad_request("Filename and file type are required"));
        };
        let file_type = parse_file_type(&file_type)?;

        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let geofile = Geofile {
            id: ObjectId::new(),
            filename,
            filepath: data.filepath,
            file_type,
            file_size: data.file_size,
            coordinates: data.coordinates,
            bounding_box: data.bounding_box,
            address: data.address,
            location_name: data.location_name,
            description: data.description.unwrap_or_default(),
            metadata: data.metadata,
            tags: data.tags,
            coordinate_system: present(data.coordinate_system)
                .unwrap_or_else(default_coordinate_system),
            access_level: data.access_level.unwrap_or_default(),
            is_public: data.is_public.unwrap_or(false),
            case_id: data.case_id,
            ob_id: data.ob_id,
            evidence_id: data.evidence_id,
            uploaded_by: self.context.auth().session().map(|session| session.id.clone()),
            download_count: 0,
            last_accessed_at: now,
            created_at: now,
            updated_at: now,
        };

        geofiles.insert(&geofile).await?;
        log::info!("Created geofile {} ({})", geofile.filename, geofile.file_type);

        Ok(geofile.stringify())
    }

    /// Stores an uploaded geographic file and records it. The `filename`
    /// form field labels the record; the file type falls back to the
    /// uploaded file's extension.
    pub async fn upload(&self, payload: Multipart) -> error::Result<Geofile<String>> {
        let mut form = read_multipart(payload, MAX_GEOFILE_SIZE).await?;

        let Some(label) = form.field("filename") else {
            return Err(bad_request("Name/Label is required"));
        };

        let Some(file) = std::mem::take(&mut form.files)
            .into_iter()
            .find(|file| file.field == "file")
        else {
            return Err(bad_request("No file uploaded"));
        };

        let ext = match extension(&file.filename) {
            Some(ext) if GEOFILE_TYPES.contains(&ext.as_str()) => ext,
            _ => {
                return Err(bad_request(format!(
                    "Invalid file type. Allowed types: {}",
                    GEOFILE_TYPES
                        .iter()
                        .map(|ext| format!(".{}", ext))
                        .collect::<Vec<_>>()
                        .join(", ")
                )))
            }
        };

        let file_type = parse_file_type(&form.field("fileType").unwrap_or_else(|| ext.clone()))?;
        let access_level = match form.field("accessLevel") {
            Some(level) => AccessLevel::parse(&level)?,
            None => AccessLevel::default(),
        };
        let coordinate_system = form
            .field("coordinateSystem")
            .unwrap_or_else(default_coordinate_system);

        let storage = self.context.try_get_manual::<UploadStorage>()?;
        let stored = storage
            .save(GEOFILES_FOLDER, GEOFILES_FOLDER, &ext, file.bytes)
            .await?;

        let filename = if extension(&label).as_deref() == Some(ext.as_str()) {
            label.clone()
        } else {
            format!("{}.{}", label, ext)
        };

        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let geofile = Geofile {
            id: ObjectId::new(),
            filename,
            filepath: Some(stored.url),
            file_type,
            file_size: Some(stored.size),
            coordinates: None,
            bounding_box: None,
            address: None,
            location_name: Some(label),
            description: form.field("description").unwrap_or_default(),
            metadata: json!({
                "originalName": file.filename,
                "contentType": file.content_type,
                "coordinateSystem": coordinate_system,
                "uploadMethod": "web_interface",
            }),
            tags: form
                .field("tags")
                .map(|tags| lenient::split_list(&tags))
                .unwrap_or_default(),
            coordinate_system,
            access_level,
            is_public: form.field("isPublic").as_deref() == Some("true"),
            case_id: form.field("caseId"),
            ob_id: form.field("obId"),
            evidence_id: form.field("evidenceId"),
            uploaded_by: self.context.auth().session().map(|session| session.id.clone()),
            download_count: 0,
            last_accessed_at: now,
            created_at: now,
            updated_at: now,
        };

        geofiles.insert(&geofile).await?;
        log::info!(
            "Uploaded geofile {} ({} bytes)",
            geofile.filename,
            stored.size
        );

        Ok(geofile.stringify())
    }

    pub async fn change(
        &self,
        id: ObjectId,
        mut change: GeofileChange,
    ) -> error::Result<Geofile<String>> {
        if let Some(file_type) = change.file_type.take() {
            change.file_type = Some(parse_file_type(&file_type)?);
        }

        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let Some(geofile) = geofiles.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Geofile"));
        };

        Ok(geofile.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Geofile<String>> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let Some(geofile) = geofiles.delete("id", &id).await? else {
            return Err(not_found("Geofile"));
        };

        log::info!("Deleted geofile {}", geofile.filename);
        Ok(geofile.stringify())
    }

    pub async fn increment_download(&self, id: ObjectId) -> error::Result<Download> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let update = doc! {
            "$inc": {"downloadCount": 1_i64},
            "$set": {"lastAccessedAt": Utc::now().timestamp_micros()},
        };
        let Some(geofile) = geofiles.update(&id, update).await? else {
            return Err(not_found("Geofile"));
        };

        Ok(Download {
            download_url: geofile.filepath,
            filename: geofile.filename,
            file_type: geofile.file_type,
            file_size: geofile.file_size,
        })
    }

    pub async fn stats(&self) -> error::Result<GeofileStats> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let all = geofiles.query(doc! {}).await?;

        let mut stats = GeofileStats {
            total: all.len() as u64,
            by_file_type: HashMap::new(),
            by_access_level: HashMap::new(),
            total_downloads: 0,
        };
        for geofile in all {
            *stats.by_file_type.entry(geofile.file_type).or_default() += 1;
            *stats.by_access_level.entry(geofile.access_level).or_default() += 1;
            stats.total_downloads += geofile.download_count;
        }

        Ok(stats)
    }

    pub async fn search_by_location(
        &self,
        query: LocationQuery,
    ) -> error::Result<Vec<Geofile<String>>> {
        let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
            return Err(bad_request("Latitude and longitude required"));
        };
        let radius = query
            .radius
            .filter(|radius| *radius > 0.0)
            .unwrap_or(DEFAULT_RADIUS_METERS);

        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        Ok(geofiles
            .query(doc! {"coordinates": {"$ne": Bson::Null}})
            .await?
            .into_iter()
            .filter(|geofile| {
                geofile
                    .coordinates
                    .as_deref()
                    .map_or(false, |coordinates| within(coordinates, (lat, lng), radius))
            })
            .map(Geofile::stringify)
            .collect())
    }

    pub async fn link_case(&self, id: ObjectId, case_id: String) -> error::Result<Geofile<String>> {
        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let update = doc! {
            "$set": {"caseId": case_id, "updatedAt": Utc::now().timestamp_micros()},
        };
        let Some(geofile) = geofiles.update(&id, update).await? else {
            return Err(not_found("Geofile"));
        };

        Ok(geofile.stringify())
    }

    pub async fn add_tags(&self, id: ObjectId, data: AddTags) -> error::Result<Geofile<String>> {
        let Ok(tags) = serde_json::from_value::<Vec<String>>(data.tags) else {
            return Err(bad_request("Tags must be an array"));
        };

        let geofiles = self.context.try_get_repository::<Geofile<ObjectId>>()?;

        let update = doc! {
            "$addToSet": {"tags": {"$each": tags}},
            "$set": {"updatedAt": Utc::now().timestamp_micros()},
        };
        let Some(geofile) = geofiles.update(&id, update).await? else {
            return Err(not_found("Geofile"));
        };

        Ok(geofile.stringify())
    }
}
