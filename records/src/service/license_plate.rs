use chrono::Utc;
use common::{
    context::Context,
    entities::license_plate::{LicensePlate, PlateStatus},
    error::{self, bad_request, not_found, AddCode},
    query::{change_set, equals_ignore_case, present},
};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLicensePlate {
    pub plate_number: Option<String>,
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
    pub status: Option<PlateStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePlateChange {
    pub plate_number: Option<String>,
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
    pub status: Option<PlateStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicensePlateFilter {
    pub status: Option<String>,
}

pub struct LicensePlateService {
    context: Context,
}

impl LicensePlateService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(
        &self,
        filter: LicensePlateFilter,
    ) -> error::Result<Vec<LicensePlate<String>>> {
        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let mut query = Document::new();
        if let Some(status) = filter.status.filter(|status| !status.is_empty()) {
            query.insert("status", status);
        }

        Ok(plates
            .query(query)
            .await?
            .into_iter()
            .map(LicensePlate::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<LicensePlate<String>> {
        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let Some(plate) = plates.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("License plate"));
        };

        Ok(plate.stringify())
    }

    /// Lookup by the number printed on the plate, ignoring case.
    pub async fn search(&self, plate_number: &str) -> error::Result<LicensePlate<String>> {
        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let Some(plate) = plates
            .query(doc! {"plateNumber": equals_ignore_case(plate_number.trim())})
            .await?
            .into_iter()
            .next()
        else {
            return Err(not_found("License plate"));
        };

        Ok(plate.stringify())
    }

    pub async fn create(&self, data: CreateLicensePlate) -> error::Result<LicensePlate<String>> {
        let Some(plate_number) = present(data.plate_number) else {
            return Err(bad_request("Plate number is required"));
        };

        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let plate = LicensePlate {
            id: ObjectId::new(),
            plate_number,
            owner_name: data.owner_name,
            father_name: data.father_name,
            mother_name: data.mother_name,
            id_number: data.id_number,
            passport_number: data.passport_number,
            owner_image: data.owner_image,
            vehicle_type: data.vehicle_type,
            vehicle_model: data.vehicle_model,
            vehicle_color: data.vehicle_color,
            registration_date: data.registration_date,
            expiry_date: data.expiry_date,
            status: data.status.unwrap_or_default(),
            added_by_id: self.context.auth().session().map(|session| session.id.clone()),
            created_at: now,
            updated_at: now,
        };

        plates.insert(&plate).await.map_err(|err| {
            if err.code == 409 {
                anyhow::anyhow!("License plate {} already exists", plate.plate_number).code(409)
            } else {
                err
            }
        })?;

        Ok(plate.stringify())
    }

    pub async fn change(
        &self,
        id: ObjectId,
        change: LicensePlateChange,
    ) -> error::Result<LicensePlate<String>> {
        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let Some(plate) = plates.update(&id, change_set(&change)?).await? else {
            return Err(not_found("License plate"));
        };

        Ok(plate.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<LicensePlate<String>> {
        let plates = self.context.try_get_repository::<LicensePlate<ObjectId>>()?;

        let Some(plate) = plates.delete("id", &id).await? else {
            return Err(not_found("License plate"));
        };

        Ok(plate.stringify())
    }
}
