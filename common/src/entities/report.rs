use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReportStatus {
    #[default]
    Pending,
    Approved,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReportPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report<Id> {
    pub id: Id,
    pub report_number: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
    pub requested_by: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub priority: ReportPriority,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Report<ObjectId> {
    pub fn stringify(self) -> Report<String> {
        Report {
            id: self.id.to_hex(),
            report_number: self.report_number,
            kind: self.kind,
            title: self.title,
            content: self.content,
            case_id: self.case_id,
            ob_id: self.ob_id,
            evidence_id: self.evidence_id,
            requested_by: self.requested_by,
            status: self.status,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Report<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
