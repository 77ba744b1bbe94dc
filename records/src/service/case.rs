use chrono::Utc;
use common::{
    context::Context,
    entities::case::{Case, CaseStatus, Priority},
    error::{self, bad_request, not_found},
    query::{change_set, present},
    reference::{insert_numbered, ReferenceKind},
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCase {
    pub case_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<CaseStatus>,
    pub incident_date: Option<String>,
    pub location: Option<String>,
    pub assigned_officer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseChange {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<CaseStatus>,
    pub incident_date: Option<String>,
    pub location: Option<String>,
    pub assigned_officer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    pub status: Option<String>,
    pub assigned_officer: Option<String>,
}

impl CaseFilter {
    fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            filter.insert("status", status);
        }
        if let Some(officer) = self.assigned_officer.as_deref().filter(|s| !s.is_empty()) {
            filter.insert("assignedOfficer", officer);
        }
        filter
    }
}

pub struct CaseService {
    context: Context,
}

impl CaseService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self, filter: CaseFilter) -> error::Result<Vec<Case<String>>> {
        let cases = self.context.try_get_repository::<Case<ObjectId>>()?;

        Ok(cases
            .query(filter.to_document())
            .await?
            .into_iter()
            .map(Case::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Case<String>> {
        let cases = self.context.try_get_repository::<Case<ObjectId>>()?;

        let Some(case) = cases.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Case"));
        };

        Ok(case.stringify())
    }

    pub async fn create(&self, data: CreateCase) -> error::Result<Case<String>> {
        let (Some(title), Some(description), Some(kind)) = (
            present(data.title),
            present(data.description),
            present(data.kind),
        ) else {
            return Err(bad_request("Title, description and type are required"));
        };

        let cases = self.context.try_get_repository::<Case<ObjectId>>()?;
        let created_by_id = self.context.auth().session().map(|session| session.id.clone());
        let now = Utc::now().timestamp_micros();

        let case = insert_numbered(&cases, data.case_number, ReferenceKind::Case, |case_number| {
            Case {
                id: ObjectId::new(),
                case_number,
                title: title.clone(),
                description: description.clone(),
                kind: kind.clone(),
                priority: data.priority.unwrap_or_default(),
                status: data.status.unwrap_or_default(),
                incident_date: data.incident_date.clone(),
                location: data.location.clone(),
                assigned_officer: data.assigned_officer.clone(),
                created_by_id: created_by_id.clone(),
                reported_date: now,
                created_at: now,
                updated_at: now,
            }
        })
        .await?;

        log::info!("Opened case {}", case.case_number);
        Ok(case.stringify())
    }

    pub async fn change(&self, id: ObjectId, change: CaseChange) -> error::Result<Case<String>> {
        let cases = self.context.try_get_repository::<Case<ObjectId>>()?;

        let Some(case) = cases.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Case"));
        };

        Ok(case.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Case<String>> {
        let cases = self.context.try_get_repository::<Case<ObjectId>>()?;

        let Some(case) = cases.delete("id", &id).await? else {
            return Err(not_found("Case"));
        };

        log::info!("Deleted case {}", case.case_number);
        Ok(case.stringify())
    }
}
