use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CaseStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case<Id> {
    pub id: Id,
    pub case_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: CaseStatus,
    pub incident_date: Option<String>,
    pub location: Option<String>,
    pub assigned_officer: Option<String>,
    pub created_by_id: Option<String>,
    pub reported_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Case<ObjectId> {
    pub fn stringify(self) -> Case<String> {
        Case {
            id: self.id.to_hex(),
            case_number: self.case_number,
            title: self.title,
            description: self.description,
            kind: self.kind,
            priority: self.priority,
            status: self.status,
            incident_date: self.incident_date,
            location: self.location,
            assigned_officer: self.assigned_officer,
            created_by_id: self.created_by_id,
            reported_date: self.reported_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Case<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
