use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

use super::case::Priority;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EvidenceType {
    Physical,
    Digital,
    Document,
    Photo,
    Video,
    Audio,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EvidenceStatus {
    #[default]
    Collected,
    Analyzed,
    Stored,
    Released,
    Disposed,
    Missing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Condition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Damaged,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
    Audio,
    Document,
}

/// One hand-off in the chain of custody. Entries are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustodyEntry {
    pub action: String,
    pub officer: String,
    pub timestamp: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub uploaded_by: Option<String>,
    pub uploaded_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evidence<Id> {
    pub id: Id,
    pub evidence_number: String,
    #[serde(rename = "type")]
    pub kind: EvidenceType,
    pub description: String,
    pub location: String,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    #[serde(default)]
    pub status: EvidenceStatus,
    pub collected_by: String,
    pub collected_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub serial_number: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    pub storage_location: Option<String>,
    pub evidence_room: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub bags_sealed: bool,
    #[serde(default)]
    pub photographed: bool,
    #[serde(default)]
    pub fingerprinted: bool,
    #[serde(default)]
    pub dna_collected: bool,
    pub custody_log: Vec<CustodyEntry>,
    #[serde(default)]
    pub media: Vec<MediaFile>,
    pub disposal_date: Option<String>,
    pub disposal_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Evidence<ObjectId> {
    pub fn stringify(self) -> Evidence<String> {
        Evidence {
            id: self.id.to_hex(),
            evidence_number: self.evidence_number,
            kind: self.kind,
            description: self.description,
            location: self.location,
            case_id: self.case_id,
            ob_id: self.ob_id,
            status: self.status,
            collected_by: self.collected_by,
            collected_at: self.collected_at,
            tags: self.tags,
            weight: self.weight,
            dimensions: self.dimensions,
            serial_number: self.serial_number,
            condition: self.condition,
            storage_location: self.storage_location,
            evidence_room: self.evidence_room,
            priority: self.priority,
            is_sealed: self.is_sealed,
            bags_sealed: self.bags_sealed,
            photographed: self.photographed,
            fingerprinted: self.fingerprinted,
            dna_collected: self.dna_collected,
            custody_log: self.custody_log,
            media: self.media,
            disposal_date: self.disposal_date,
            disposal_method: self.disposal_method,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Evidence<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
