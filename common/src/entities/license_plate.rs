use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlateStatus {
    #[default]
    Active,
    Suspended,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LicensePlate<Id> {
    pub id: Id,
    pub plate_number: String,
    pub owner_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub owner_image: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_color: Option<String>,
    pub registration_date: Option<String>,
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub status: PlateStatus,
    pub added_by_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LicensePlate<ObjectId> {
    pub fn stringify(self) -> LicensePlate<String> {
        LicensePlate {
            id: self.id.to_hex(),
            plate_number: self.plate_number,
            owner_name: self.owner_name,
            father_name: self.father_name,
            mother_name: self.mother_name,
            id_number: self.id_number,
            passport_number: self.passport_number,
            owner_image: self.owner_image,
            vehicle_type: self.vehicle_type,
            vehicle_model: self.vehicle_model,
            vehicle_color: self.vehicle_color,
            registration_date: self.registration_date,
            expiry_date: self.expiry_date,
            status: self.status,
            added_by_id: self.added_by_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for LicensePlate<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
