use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfficerStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Officer<Id> {
    pub id: Id,
    pub badge_number: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub rank: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_joined: Option<String>,
    pub specialization: Option<String>,
    pub years_of_service: Option<u32>,
    pub supervisor: Option<String>,
    pub shift: String,
    #[serde(default)]
    pub status: OfficerStatus,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Officer<ObjectId> {
    pub fn stringify(self) -> Officer<String> {
        Officer {
            id: self.id.to_hex(),
            badge_number: self.badge_number,
            first_name: self.first_name,
            last_name: self.last_name,
            department: self.department,
            position: self.position,
            rank: self.rank,
            email: self.email,
            phone: self.phone,
            date_joined: self.date_joined,
            specialization: self.specialization,
            years_of_service: self.years_of_service,
            supervisor: self.supervisor,
            shift: self.shift,
            status: self.status,
            emergency_contact: self.emergency_contact,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Officer<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
