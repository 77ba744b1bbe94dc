use std::collections::HashMap;

use chrono::Utc;
use common::{
    context::Context,
    entities::{
        case::Priority,
        evidence::{
            Condition, CustodyEntry, Evidence, EvidenceStatus, EvidenceType, MediaFile, MediaType,
        },
    },
    error::{self, bad_request, not_found},
    lenient,
    query::{change_set, present},
    reference::{insert_numbered, ReferenceKind},
};
use mongodb::bson::{doc, oid::ObjectId, to_bson, Bson, Document};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_OFFICER: &str = "Unknown Officer";
pub const INITIAL_ACTION: &str = "collected";
pub const INITIAL_NOTES: &str = "Initial evidence collection";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedia {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type")]
    pub kind: Option<MediaType>,
    pub uploaded_by: Option<String>,
}

impl NewMedia {
    fn into_media(self, now: i64) -> error::Result<MediaFile> {
        let (false, false, Some(kind)) = (self.name.is_empty(), self.url.is_empty(), self.kind)
        else {
            return Err(bad_request("Missing required fields: name, url, type"));
        };

        Ok(MediaFile {
            name: self.name,
            url: self.url,
            kind,
            uploaded_by: self.uploaded_by,
            uploaded_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustodyEntry {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub officer: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvidence {
    pub evidence_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<EvidenceType>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub status: Option<EvidenceStatus>,
    pub collected_by: Option<String>,
    pub collected_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string_list")]
    pub tags: Option<Vec<String>>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<Condition>,
    pub storage_location: Option<String>,
    pub evidence_room: Option<String>,
    pub priority: Option<Priority>,
    pub is_sealed: Option<bool>,
    pub bags_sealed: Option<bool>,
    pub photographed: Option<bool>,
    pub fingerprinted: Option<bool>,
    pub dna_collected: Option<bool>,
    pub media: Option<Vec<NewMedia>>,
    pub disposal_date: Option<String>,
    pub disposal_method: Option<String>,
    pub notes: Option<String>,
}

/// Editable evidence fields. The custody log, media list, evidence number
/// and creation time have no place here and are dropped from patches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceChange {
    #[serde(rename = "type")]
    pub kind: Option<EvidenceType>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub status: Option<EvidenceStatus>,
    pub collected_by: Option<String>,
    pub collected_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string_list")]
    pub tags: Option<Vec<String>>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<Condition>,
    pub storage_location: Option<String>,
    pub evidence_room: Option<String>,
    pub priority: Option<Priority>,
    pub is_sealed: Option<bool>,
    pub bags_sealed: Option<bool>,
    pub photographed: Option<bool>,
    pub fingerprinted: Option<bool>,
    pub dna_collected: Option<bool>,
    pub disposal_date: Option<String>,
    pub disposal_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvidenceFilter {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceStats {
    pub total: u64,
    pub by_status: HashMap<EvidenceStatus, u64>,
    pub by_type: HashMap<EvidenceType, u64>,
}

pub struct EvidenceService {
    context: Context,
}

impl EvidenceService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self, filter: EvidenceFilter) -> error::Result<Vec<Evidence<String>>> {
        let mut query = Document::new();
        if let Some(status) = filter.status.filter(|status| !status.is_empty()) {
            query.insert("status", status);
        }
        if let Some(kind) = filter.kind.filter(|kind| !kind.is_empty()) {
            query.insert("type", kind);
        }

        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        Ok(evidence
            .query(query)
            .await?
            .into_iter()
            .map(Evidence::stringify)
            .collect())
    }

    /// Evidence soft-linked to a case or OB entry through `field`.
    async fn find_linked(&self, field: &str, id: &str) -> error::Result<Vec<Evidence<String>>> {
        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        Ok(evidence
            .find_many(field, &Bson::String(id.to_string()))
            .await?
            .into_iter()
            .map(Evidence::stringify)
            .collect())
    }

    pub async fn find_by_case(&self, case_id: &str) -> error::Result<Vec<Evidence<String>>> {
        self.find_linked("caseId", case_id).await
    }

    pub async fn find_by_ob(&self, ob_id: &str) -> error::Result<Vec<Evidence<String>>> {
        self.find_linked("obId", ob_id).await
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Evidence<String>> {
        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let Some(item) = evidence.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Evidence"));
        };

        Ok(item.stringify())
    }

    pub async fn create(&self, data: CreateEvidence) -> error::Result<Evidence<String>> {
        let (Some(kind), Some(description), Some(location)) =
            (data.kind, present(data.description), present(data.location))
        else {
            return Err(bad_request("Missing required fields: type, description, location"));
        };

        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let now = Utc::now();
        let timestamp = now.timestamp_micros();
        let collected_by =
            present(data.collected_by).unwrap_or_else(|| UNKNOWN_OFFICER.to_string());
        let collected_at = present(data.collected_at).unwrap_or_else(|| now.to_rfc3339());

        let media = data
            .media
            .unwrap_or_default()
            .into_iter()
            .map(|media| media.into_media(timestamp))
            .collect::<error::Result<Vec<_>>>()?;

        let custody_log = vec![CustodyEntry {
            action: INITIAL_ACTION.to_string(),
            officer: collected_by.clone(),
            timestamp,
            notes: INITIAL_NOTES.to_string(),
            location: location.clone(),
        }];

        let item = insert_numbered(
            &evidence,
            data.evidence_number,
            ReferenceKind::Evidence,
            |evidence_number| Evidence {
                id: ObjectId::new(),
                evidence_number,
                kind,
                description: description.clone(),
                location: location.clone(),
                case_id: data.case_id.clone(),
                ob_id: data.ob_id.clone(),
                status: data.status.unwrap_or_default(),
                collected_by: collected_by.clone(),
                collected_at: collected_at.clone(),
                tags: data.tags.clone().unwrap_or_default(),
                weight: data.weight.clone(),
                dimensions: data.dimensions.clone(),
                serial_number: data.serial_number.clone(),
                condition: data.condition.unwrap_or_default(),
                storage_location: data.storage_location.clone(),
                evidence_room: data.evidence_room.clone(),
                priority: data.priority.unwrap_or_default(),
                is_sealed: data.is_sealed.unwrap_or(false),
                bags_sealed: data.bags_sealed.unwrap_or(false),
                photographed: data.photographed.unwrap_or(false),
                fingerprinted: data.fingerprinted.unwrap_or(false),
                dna_collected: data.dna_collected.unwrap_or(false),
                custody_log: custody_log.clone(),
                media: media.clone(),
                disposal_date: data.disposal_date.clone(),
                disposal_method: data.disposal_method.clone(),
                notes: data.notes.clone(),
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
        .await?;

        log::info!("Logged evidence {}", item.evidence_number);
        Ok(item.stringify())
    }

    pub async fn change(
        &self,
        id: ObjectId,
        change: EvidenceChange,
    ) -> error::Result<Evidence<String>> {
        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let Some(item) = evidence.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Evidence"));
        };

        Ok(item.stringify())
    }

    /// Appends one hand-off to the chain of custody. Earlier entries are
    /// never touched.
    pub async fn add_custody_entry(
        &self,
        id: ObjectId,
        entry: NewCustodyEntry,
    ) -> error::Result<Evidence<String>> {
        if entry.action.trim().is_empty() || entry.officer.trim().is_empty() {
            return Err(bad_request("Missing required fields: action, officer"));
        }

        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let now = Utc::now().timestamp_micros();
        let entry = CustodyEntry {
            action: entry.action,
            officer: entry.officer,
            timestamp: now,
            notes: entry.notes,
            location: entry.location,
        };

        let pushed = to_bson(&entry)?;
        let update = doc! {
            "$push": {"custodyLog": pushed},
            "$set": {"updatedAt": now},
        };
        let Some(item) = evidence.update(&id, update).await? else {
            return Err(not_found("Evidence"));
        };

        log::info!(
            "Custody of {}: {} by {}",
            item.evidence_number,
            entry.action,
            entry.officer
        );
        Ok(item.stringify())
    }

    pub async fn add_media(&self, id: ObjectId, media: NewMedia) -> error::Result<Evidence<String>> {
        let now = Utc::now().timestamp_micros();
        let media = media.into_media(now)?;

        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let pushed = to_bson(&media)?;
        let update = doc! {
            "$push": {"media": pushed},
            "$set": {"updatedAt": now},
        };
        let Some(item) = evidence.update(&id, update).await? else {
            return Err(not_found("Evidence"));
        };

        Ok(item.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Evidence<String>> {
        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let Some(item) = evidence.delete("id", &id).await? else {
            return Err(not_found("Evidence"));
        };

        log::info!("Deleted evidence {}", item.evidence_number);
        Ok(item.stringify())
    }

    pub async fn stats(&self) -> error::Result<EvidenceStats> {
        let evidence = self.context.try_get_repository::<Evidence<ObjectId>>()?;

        let items = evidence.query(doc! {}).await?;

        let mut stats = EvidenceStats {
            total: items.len() as u64,
            by_status: HashMap::new(),
            by_type: HashMap::new(),
        };
        for item in items {
            *stats.by_status.entry(item.status).or_default() += 1;
            *stats.by_type.entry(item.kind).or_default() += 1;
        }

        Ok(stats)
    }
}
