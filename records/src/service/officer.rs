use chrono::Utc;
use common::{
    context::Context,
    entities::officer::{EmergencyContact, Officer, OfficerStatus},
    error::{self, bad_request, not_found},
    query::{change_set, equals_ignore_case, present},
    reference::{insert_numbered, ReferenceKind},
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHIFT: &str = "Day";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficer {
    pub badge_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub rank: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_joined: Option<String>,
    pub specialization: Option<String>,
    pub years_of_service: Option<u32>,
    pub supervisor: Option<String>,
    pub shift: Option<String>,
    pub status: Option<OfficerStatus>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerChange {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub rank: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_joined: Option<String>,
    pub specialization: Option<String>,
    pub years_of_service: Option<u32>,
    pub supervisor: Option<String>,
    pub shift: Option<String>,
    pub status: Option<OfficerStatus>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficerFilter {
    pub department: Option<String>,
}

pub struct OfficerService {
    context: Context,
}

impl OfficerService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self, filter: OfficerFilter) -> error::Result<Vec<Officer<String>>> {
        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let mut query = Document::new();
        if let Some(department) = filter.department.filter(|d| !d.is_empty()) {
            query.insert("department", equals_ignore_case(&department));
        }

        Ok(officers
            .query(query)
            .await?
            .into_iter()
            .map(Officer::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Officer<String>> {
        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let Some(officer) = officers.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Officer"));
        };

        Ok(officer.stringify())
    }

    pub async fn find_by_badge(&self, badge_number: &str) -> error::Result<Officer<String>> {
        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let Some(officer) = officers
            .find("badgeNumber", &Bson::String(badge_number.trim().to_string()))
            .await?
        else {
            return Err(not_found("Officer"));
        };

        Ok(officer.stringify())
    }

    pub async fn create(&self, data: CreateOfficer) -> error::Result<Officer<String>> {
        let (Some(first_name), Some(last_name)) =
            (present(data.first_name), present(data.last_name))
        else {
            return Err(bad_request("First name and last name are required"));
        };

        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let shift = present(data.shift).unwrap_or_else(|| DEFAULT_SHIFT.to_string());

        let officer = insert_numbered(
            &officers,
            data.badge_number,
            ReferenceKind::Officer,
            |badge_number| Officer {
                id: ObjectId::new(),
                badge_number,
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                department: data.department.clone(),
                position: data.position.clone(),
                rank: data.rank.clone(),
                email: data.email.clone(),
                phone: data.phone.clone(),
                date_joined: data.date_joined.clone(),
                specialization: data.specialization.clone(),
                years_of_service: data.years_of_service,
                supervisor: data.supervisor.clone(),
                shift: shift.clone(),
                status: data.status.unwrap_or_default(),
                emergency_contact: data.emergency_contact.clone(),
                created_at: now,
                updated_at: now,
            },
        )
        .await?;

        log::info!("Registered officer {}", officer.badge_number);
        Ok(officer.stringify())
    }

    pub async fn change(&self, id: ObjectId, change: OfficerChange) -> error::Result<Officer<String>> {
        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let Some(officer) = officers.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Officer"));
        };

        Ok(officer.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Officer<String>> {
        let officers = self.context.try_get_repository::<Officer<ObjectId>>()?;

        let Some(officer) = officers.delete("id", &id).await? else {
            return Err(not_found("Officer"));
        };

        Ok(officer.stringify())
    }
}
