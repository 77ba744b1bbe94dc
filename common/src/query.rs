use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::Serialize;

use crate::error::{self, AddCode};

pub fn parse_id(id: &str) -> error::Result<ObjectId> {
    id.parse()
        .map_err(|_| anyhow::anyhow!("Invalid id: {}", id).code(400))
}

/// Case-insensitive substring match. The term is matched literally.
pub fn contains(term: &str) -> Bson {
    Bson::Document(doc! {"$regex": regex::escape(term), "$options": "i"})
}

/// Case-insensitive whole-value match.
pub fn equals_ignore_case(term: &str) -> Bson {
    Bson::Document(doc! {"$regex": format!("^{}$", regex::escape(term)), "$options": "i"})
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date
/// used as an upper bound covers the whole day.
pub fn parse_date(value: &str, end_of_day: bool) -> error::Result<i64> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.with_timezone(&Utc).timestamp_micros());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date: {}", value).code(400))?;

    let time = if end_of_day {
        date.and_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };

    let Some(time) = time else {
        return Err(anyhow::anyhow!("Invalid date: {}", value).code(400));
    };

    Ok(Utc.from_utc_datetime(&time).timestamp_micros())
}

/// `createdAt` range condition, or `None` when neither bound is given.
pub fn created_between(from: Option<&str>, to: Option<&str>) -> error::Result<Option<Bson>> {
    let mut range = Document::new();
    if let Some(from) = from.filter(|from| !from.is_empty()) {
        range.insert("$gte", parse_date(from, false)?);
    }
    if let Some(to) = to.filter(|to| !to.is_empty()) {
        range.insert("$lte", parse_date(to, true)?);
    }

    if range.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Bson::Document(range)))
    }
}

/// Trimmed value, or `None` when nothing but whitespace was sent.
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `$set` update from a partial change: absent fields are left alone and
/// `updatedAt` is always refreshed.
pub fn change_set<C: Serialize>(change: &C) -> error::Result<Document> {
    let change = mongodb::bson::to_document(change)?;

    let mut set = Document::new();
    for (key, value) in change {
        if value != Bson::Null {
            set.insert(key, value);
        }
    }
    set.insert("updatedAt", Utc::now().timestamp_micros());

    Ok(doc! {"$set": set})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_only_upper_bound_is_inclusive() {
        let from = parse_date("2024-05-01", false).unwrap();
        let to = parse_date("2024-05-01", true).unwrap();
        assert_eq!(to - from, 24 * 60 * 60 * 1_000_000 - 1);
    }

    #[test]
    fn test_rfc3339_dates() {
        let at = parse_date("2024-05-01T10:00:00Z", true).unwrap();
        assert_eq!(at, parse_date("2024-05-01", false).unwrap() + 10 * 3600 * 1_000_000);
        assert_eq!(parse_date("yesterday", false).unwrap_err().code, 400);
    }

    #[test]
    fn test_search_term_is_literal() {
        let Bson::Document(condition) = contains("a.b (1)") else {
            panic!("expected a document");
        };
        assert_eq!(condition.get_str("$regex").unwrap(), r"a\.b \(1\)");
    }

    #[test]
    fn test_present_trims_and_drops_blank_input() {
        assert_eq!(present(Some("  Nairobi CBD ".to_string())).as_deref(), Some("Nairobi CBD"));
        assert_eq!(present(Some("   ".to_string())), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_change_set_skips_absent_fields() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Change {
            title: Option<String>,
            assigned_officer: Option<String>,
        }

        let update = change_set(&Change {
            title: Some("Burglary".to_string()),
            assigned_officer: None,
        })
        .unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "Burglary");
        assert!(!set.contains_key("assignedOfficer"));
        assert!(set.contains_key("updatedAt"));
    }
}
