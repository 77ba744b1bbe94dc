use chrono::Utc;
use common::{
    context::Context,
    entities::ob_entry::ObEntry,
    error::{self, bad_request, not_found},
    query::{change_set, created_between, present},
    reference::{insert_numbered, ReferenceKind},
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_OFFICER: &str = "Unknown Officer";
pub const DEFAULT_STATUS: &str = "Pending";
pub const DEFAULT_TYPE: &str = "Incident";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateObEntry {
    pub ob_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub date_time: Option<String>,
    pub location: Option<String>,
    pub involved_persons: Option<String>,
    pub action_taken: Option<String>,
    pub officer: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObEntryChange {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub date_time: Option<String>,
    pub location: Option<String>,
    pub involved_persons: Option<String>,
    pub action_taken: Option<String>,
    pub officer: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObEntryFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub struct ObEntryService {
    context: Context,
}

impl ObEntryService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self, filter: ObEntryFilter) -> error::Result<Vec<ObEntry<String>>> {
        let entries = self.context.try_get_repository::<ObEntry<ObjectId>>()?;

        let mut query = Document::new();
        if let Some(range) =
            created_between(filter.date_from.as_deref(), filter.date_to.as_deref())?
        {
            query.insert("createdAt", range);
        }

        Ok(entries
            .query(query)
            .await?
            .into_iter()
            .map(ObEntry::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<ObEntry<String>> {
        let entries = self.context.try_get_repository::<ObEntry<ObjectId>>()?;

        let Some(entry) = entries.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("OB entry"));
        };

        Ok(entry.stringify())
    }

    pub async fn create(&self, data: CreateObEntry) -> error::Result<ObEntry<String>> {
        let Some(description) = present(data.description) else {
            return Err(bad_request("Description is required"));
        };

        let entries = self.context.try_get_repository::<ObEntry<ObjectId>>()?;

        let session = self.context.auth().session();
        let officer = present(data.officer)
            .or_else(|| session.map(|session| session.full_name()))
            .unwrap_or_else(|| UNKNOWN_OFFICER.to_string());
        let recording_officer_id = session.map(|session| session.id.clone());

        let now = Utc::now();
        let date_time = present(data.date_time).unwrap_or_else(|| now.to_rfc3339());
        let date = present(data.date).unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
        let time = present(data.time).unwrap_or_else(|| now.format("%H:%M:%S").to_string());
        let kind = present(data.kind).unwrap_or_else(|| DEFAULT_TYPE.to_string());
        let status = present(data.status).unwrap_or_else(|| DEFAULT_STATUS.to_string());
        let timestamp = now.timestamp_micros();

        let entry = insert_numbered(&entries, data.ob_number, ReferenceKind::ObEntry, |ob_number| {
            ObEntry {
                id: ObjectId::new(),
                ob_number,
                kind: kind.clone(),
                description: description.clone(),
                date: date.clone(),
                time: time.clone(),
                date_time: date_time.clone(),
                location: data.location.clone(),
                involved_persons: data.involved_persons.clone(),
                action_taken: data.action_taken.clone(),
                officer: officer.clone(),
                status: status.clone(),
                recording_officer_id: recording_officer_id.clone(),
                created_at: timestamp,
                updated_at: timestamp,
            }
        })
        .await?;

        log::info!("Recorded OB entry {}", entry.ob_number);
        Ok(entry.stringify())
    }

    pub async fn change(&self, id: ObjectId, change: ObEntryChange) -> error::Result<ObEntry<String>> {
        let entries = self.context.try_get_repository::<ObEntry<ObjectId>>()?;

        let Some(entry) = entries.update(&id, change_set(&change)?).await? else {
            return Err(not_found("OB entry"));
        };

        Ok(entry.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<ObEntry<String>> {
        let entries = self.context.try_get_repository::<ObEntry<ObjectId>>()?;

        let Some(entry) = entries.delete("id", &id).await? else {
            return Err(not_found("OB entry"));
        };

        log::info!("Deleted OB entry {}", entry.ob_number);
        Ok(entry.stringify())
    }
}
