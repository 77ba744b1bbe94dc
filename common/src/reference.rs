use chrono::{Datelike, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::{error, repository::RepositoryObject, retry::retry_on_conflict};

/// Human-readable record numbers: `PREFIX-YYYY-XXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Case,
    Evidence,
    ObEntry,
    Report,
    Officer,
}

impl ReferenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Case => "CASE",
            ReferenceKind::Evidence => "EVD",
            ReferenceKind::ObEntry => "OB",
            ReferenceKind::Report => "RPT",
            ReferenceKind::Officer => "OFC",
        }
    }

    pub fn suffix_len(&self) -> usize {
        match self {
            ReferenceKind::Evidence => 8,
            _ => 6,
        }
    }

    pub fn generate(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.suffix_len())
            .map(|c| char::from(c).to_ascii_uppercase())
            .collect();

        format!("{}-{}-{}", self.prefix(), Utc::now().year(), suffix)
    }
}

/// Inserts a record keyed by a reference number. A number supplied by the
/// client is stored as is and a collision on it is reported; a generated
/// number is redrawn until it is free.
pub async fn insert_numbered<T, F>(
    repository: &RepositoryObject<T>,
    supplied: Option<String>,
    kind: ReferenceKind,
    build: F,
) -> error::Result<T>
where
    F: Fn(String) -> T,
{
    if let Some(number) = supplied.filter(|number| !number.trim().is_empty()) {
        let record = build(number.trim().to_string());
        repository.insert(&record).await?;
        return Ok(record);
    }

    retry_on_conflict(|| {
        let record = build(kind.generate());
        async move {
            repository.insert(&record).await?;
            Ok(record)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mongodb::bson::{doc, oid::ObjectId};
    use regex::Regex;

    use super::*;
    use crate::{entities::case::Case, repository::test_repository::TestRepository};

    #[test]
    fn test_reference_formats() {
        let year = Utc::now().year();
        let cases = [
            (ReferenceKind::Case, format!(r"^CASE-{}-[A-Z0-9]{{6}}$", year)),
            (ReferenceKind::Evidence, format!(r"^EVD-{}-[A-Z0-9]{{8}}$", year)),
            (ReferenceKind::ObEntry, format!(r"^OB-{}-[A-Z0-9]{{6}}$", year)),
            (ReferenceKind::Report, format!(r"^RPT-{}-[A-Z0-9]{{6}}$", year)),
        ];

        for (kind, pattern) in cases {
            let re = Regex::new(&pattern).unwrap();
            for _ in 0..20 {
                let number = kind.generate();
                assert!(re.is_match(&number), "{} does not match {}", number, pattern);
            }
        }
    }

    fn case(number: String) -> Case<ObjectId> {
        Case {
            id: ObjectId::new(),
            case_number: number,
            title: "Burglary".to_string(),
            description: String::new(),
            kind: "Theft".to_string(),
            priority: Default::default(),
            status: Default::default(),
            incident_date: None,
            location: None,
            assigned_officer: None,
            created_by_id: None,
            reported_date: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[actix_web::test]
    async fn test_supplied_numbers_are_kept_and_checked() {
        let cases: RepositoryObject<Case<ObjectId>> =
            Arc::new(TestRepository::new().with_unique(&["caseNumber"]));

        let stored = insert_numbered(&cases, Some("CASE-OLD-1".to_string()), ReferenceKind::Case, case)
            .await
            .unwrap();
        assert_eq!(stored.case_number, "CASE-OLD-1");

        let err = insert_numbered(&cases, Some("CASE-OLD-1".to_string()), ReferenceKind::Case, case)
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, 409);

        let generated = insert_numbered(&cases, None, ReferenceKind::Case, case)
            .await
            .unwrap();
        assert!(generated.case_number.starts_with("CASE-"));
        assert_eq!(cases.count(doc! {}).await.unwrap(), 2);
    }
}
