use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

/// An occurrence-book line: the chronological log of events reported at
/// the station desk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObEntry<Id> {
    pub id: Id,
    pub ob_number: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub date_time: String,
    pub location: Option<String>,
    pub involved_persons: Option<String>,
    pub action_taken: Option<String>,
    pub officer: String,
    pub status: String,
    pub recording_officer_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ObEntry<ObjectId> {
    pub fn stringify(self) -> ObEntry<String> {
        ObEntry {
            id: self.id.to_hex(),
            ob_number: self.ob_number,
            kind: self.kind,
            description: self.description,
            date: self.date,
            time: self.time,
            date_time: self.date_time,
            location: self.location,
            involved_persons: self.involved_persons,
            action_taken: self.action_taken,
            officer: self.officer,
            status: self.status,
            recording_officer_id: self.recording_officer_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for ObEntry<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
