use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    error::{self, AddCode},
    repository::Entity,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Available,
    OnPatrol,
    Responding,
    OutOfService,
}

impl VehicleStatus {
    pub fn parse(s: &str) -> error::Result<VehicleStatus> {
        match s {
            "available" => Ok(VehicleStatus::Available),
            "on_patrol" => Ok(VehicleStatus::OnPatrol),
            "responding" => Ok(VehicleStatus::Responding),
            "out_of_service" => Ok(VehicleStatus::OutOfService),
            _ => Err(anyhow::anyhow!("Invalid vehicle status: {}", s).code(400)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoliceVehicle<Id> {
    pub id: Id,
    pub vehicle_id: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub status: VehicleStatus,
    /// `[longitude, latitude]`
    pub location: Option<Vec<f64>>,
    pub assigned_officer: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PoliceVehicle<ObjectId> {
    pub fn stringify(self) -> PoliceVehicle<String> {
        PoliceVehicle {
            id: self.id.to_hex(),
            vehicle_id: self.vehicle_id,
            make: self.make,
            model: self.model,
            year: self.year,
            plate_number: self.plate_number,
            vehicle_type: self.vehicle_type,
            status: self.status,
            location: self.location,
            assigned_officer: self.assigned_officer,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for PoliceVehicle<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
