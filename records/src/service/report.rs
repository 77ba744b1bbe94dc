use chrono::Utc;
use common::{
    context::Context,
    entities::report::{Report, ReportPriority, ReportStatus},
    error::{self, bad_request, not_found},
    query::{change_set, present},
    reference::{insert_numbered, ReferenceKind},
};
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReport {
    pub report_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
    pub status: Option<ReportStatus>,
    pub priority: Option<ReportPriority>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportChange {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub case_id: Option<String>,
    pub ob_id: Option<String>,
    pub evidence_id: Option<String>,
    pub status: Option<ReportStatus>,
    pub priority: Option<ReportPriority>,
}

pub struct ReportService {
    context: Context,
}

impl ReportService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self) -> error::Result<Vec<Report<String>>> {
        let reports = self.context.try_get_repository::<Report<ObjectId>>()?;

        Ok(reports
            .query(doc! {})
            .await?
            .into_iter()
            .map(Report::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Report<String>> {
        let reports = self.context.try_get_repository::<Report<ObjectId>>()?;

        let Some(report) = reports.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Report"));
        };

        Ok(report.stringify())
    }

    pub async fn create(&self, data: CreateReport) -> error::Result<Report<String>> {
        let (Some(kind), Some(title), Some(content)) = (
            present(data.kind),
            present(data.title),
            present(data.content),
        ) else {
            return Err(bad_request("Type, title and content are required"));
        };

        let reports = self.context.try_get_repository::<Report<ObjectId>>()?;

        let requested_by = self.context.auth().session().map(|session| session.id.clone());
        let now = Utc::now().timestamp_micros();

        let report = insert_numbered(
            &reports,
            data.report_number,
            ReferenceKind::Report,
            |report_number| Report {
                id: ObjectId::new(),
                report_number,
                kind: kind.clone(),
                title: title.clone(),
                content: content.clone(),
                case_id: data.case_id.clone(),
                ob_id: data.ob_id.clone(),
                evidence_id: data.evidence_id.clone(),
                requested_by: requested_by.clone(),
                status: data.status.unwrap_or_default(),
                priority: data.priority.unwrap_or_default(),
                created_at: now,
                updated_at: now,
            },
        )
        .await?;

        log::info!("Filed report {}", report.report_number);
        Ok(report.stringify())
    }

    pub async fn change(&self, id: ObjectId, change: ReportChange) -> error::Result<Report<String>> {
        let reports = self.context.try_get_repository::<Report<ObjectId>>()?;

        let Some(report) = reports.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Report"));
        };

        Ok(report.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Report<String>> {
        let reports = self.context.try_get_repository::<Report<ObjectId>>()?;

        let Some(report) = reports.delete("id", &id).await? else {
            return Err(not_found("Report"));
        };

        Ok(report.stringify())
    }
}
