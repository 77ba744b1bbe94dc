use chrono::Utc;
use common::{
    context::Context,
    entities::police_vehicle::{PoliceVehicle, VehicleStatus},
    error::{self, bad_request, not_found},
    query::{change_set, present},
};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoliceVehicle {
    pub vehicle_id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub status: Option<VehicleStatus>,
    pub location: Option<Vec<f64>>,
    pub assigned_officer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliceVehicleChange {
    pub vehicle_id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub status: Option<VehicleStatus>,
    pub assigned_officer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoliceVehicleFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationChange {
    #[serde(default)]
    pub location: Value,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: String,
}

/// `[longitude, latitude]`, both numbers within range.
pub fn parse_location(value: &Value) -> error::Result<Vec<f64>> {
    let invalid = || bad_request("Invalid location format. Expected [longitude, latitude]");

    let Some([longitude, latitude]) = value.as_array().map(Vec::as_slice) else {
        return Err(invalid());
    };
    let (Some(longitude), Some(latitude)) = (longitude.as_f64(), latitude.as_f64()) else {
        return Err(invalid());
    };

    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid());
    }

    Ok(vec![longitude, latitude])
}

pub struct PoliceVehicleService {
    context: Context,
}

impl PoliceVehicleService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(
        &self,
        filter: PoliceVehicleFilter,
    ) -> error::Result<Vec<PoliceVehicle<String>>> {
        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let mut query = Document::new();
        if let Some(status) = filter.status.filter(|status| !status.is_empty()) {
            query.insert("status", status);
        }

        Ok(vehicles
            .query(query)
            .await?
            .into_iter()
            .map(PoliceVehicle::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<PoliceVehicle<String>> {
        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let Some(vehicle) = vehicles.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Police vehicle"));
        };

        Ok(vehicle.stringify())
    }

    pub async fn create(&self, data: CreatePoliceVehicle) -> error::Result<PoliceVehicle<String>> {
        let Some(vehicle_id) = present(data.vehicle_id) else {
            return Err(bad_request("Vehicle id is required"));
        };

        let location = match data.location {
            Some(location) => Some(parse_location(&serde_json::to_value(location)?)?),
            None => None,
        };

        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let vehicle = PoliceVehicle {
            id: ObjectId::new(),
            vehicle_id,
            make: data.make,
            model: data.model,
            year: data.year,
            plate_number: data.plate_number,
            vehicle_type: data.vehicle_type,
            status: data.status.unwrap_or_default(),
            location,
            assigned_officer: data.assigned_officer,
            created_at: now,
            updated_at: now,
        };

        vehicles.insert(&vehicle).await?;

        Ok(vehicle.stringify())
    }

    pub async fn change(
        &self,
        id: ObjectId,
        change: PoliceVehicleChange,
    ) -> error::Result<PoliceVehicle<String>> {
        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let Some(vehicle) = vehicles.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Police vehicle"));
        };

        Ok(vehicle.stringify())
    }

    pub async fn change_location(
        &self,
        id: ObjectId,
        change: LocationChange,
    ) -> error::Result<PoliceVehicle<String>> {
        let location = parse_location(&change.location)?;

        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let update = doc! {
            "$set": {"location": location, "updatedAt": Utc::now().timestamp_micros()}
        };
        let Some(vehicle) = vehicles.update(&id, update).await? else {
            return Err(not_found("Police vehicle"));
        };

        Ok(vehicle.stringify())
    }

    pub async fn change_status(
        &self,
        id: ObjectId,
        change: StatusChange,
    ) -> error::Result<PoliceVehicle<String>> {
        let status = VehicleStatus::parse(&change.status)?;

        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let update = doc! {
            "$set": {
                "status": mongodb::bson::to_bson(&status)?,
                "updatedAt": Utc::now().timestamp_micros(),
            }
        };
        let Some(vehicle) = vehicles.update(&id, update).await? else {
            return Err(not_found("Police vehicle"));
        };

        Ok(vehicle.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<PoliceVehicle<String>> {
        let vehicles = self.context.try_get_repository::<PoliceVehicle<ObjectId>>()?;

        let Some(vehicle) = vehicles.delete("id", &id).await? else {
            return Err(not_found("Police vehicle"));
        };

        Ok(vehicle.stringify())
    }
}
