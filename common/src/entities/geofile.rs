use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{self, AddCode},
    lenient,
    repository::Entity,
};

pub const GEOFILE_TYPES: [&str; 7] = ["shp", "kml", "geojson", "csv", "gpx", "kmz", "gml"];

pub fn parse_file_type(file_type: &str) -> error::Result<String> {
    let lower = file_type.trim().to_lowercase();
    if !GEOFILE_TYPES.contains(&lower.as_str()) {
        return Err(anyhow::anyhow!(
            "Invalid file type. Allowed types: {}",
            GEOFILE_TYPES.join(", ")
        )
        .code(400));
    }
    Ok(lower.to_uppercase())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Internal,
    Department,
    Public,
}

impl AccessLevel {
    pub fn parse(s: &str) -> error::Result<AccessLevel> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(AccessLevel::Internal),
            "department" => Ok(AccessLevel::Department),
            "public" => Ok(AccessLevel::Public),
            _ => Err(anyhow::anyhow!("Invalid access level: {}", s).code(400)),
        }
    }
}

pub fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

pub fn default_coordinate_system() -> String {
    "WGS84".to_string()
}

/// A stored geographic data file together with where it applies and who
/// may see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Geofile<Id> {
    pub id: Id,
    pub filename: String,
    pub filepath: Option<String>,
    pub file_type: String,
    pub file_size: Option<i64>,
    /// `[longitude, latitude]`
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub coordinates: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient::json_or_string")]
    pub bounding_box: Option<Vec<Vec<f64>>>,
    pub address: Option<String>,
    pub location_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_metadata", deserialize_with = "lenient::json_object")]
    pub metadata: Value,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default = "default_coordinate_system")]
    pub coordinate_system: String,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub is_public: bool,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub download_count: i64,
    pub last_accessed_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Geofile<ObjectId> {
    pub fn stringify(self) -> Geofile<String> {
        Geofile {
            id: self.id.to_hex(),
            filename: self.filename,
            filepath: self.filepath,
            file_type: self.file_type,
            file_size: self.file_size,
            coordinates: self.coordinates,
            bounding_box: self.bounding_box,
            address: self.address,
            location_name: self.location_name,
            description: self.description,
            metadata: self.metadata,
            tags: self.tags,
            coordinate_system: self.coordinate_system,
            access_level: self.access_level,
            is_public: self.is_public,
            case_id: self.case_id,
            ob_id: self.ob_id,
            evidence_id: self.evidence_id,
            uploaded_by: self.uploaded_by,
            download_count: self.download_count,
            last_accessed_at: self.last_accessed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Geofile<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
