use std::{
    cmp::{Ordering, Reverse},
    marker::PhantomData,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use regex::RegexBuilder;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode};

use super::{Entity, Repository};

/// In-memory stand-in for a MongoDB collection. Understands the subset of
/// query and update operators the services emit.
pub struct TestRepository<T> {
    _t: PhantomData<T>,
    pub db: Mutex<Vec<Document>>,
    unique: Vec<String>,
}

impl<T> Default for TestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: PhantomData,
            db: Mutex::new(Vec::new()),
            unique: Vec::new(),
        }
    }

    pub fn with_unique(mut self, fields: &[&str]) -> Self {
        self.unique = fields.iter().map(|field| field.to_string()).collect();
        self
    }

    fn lock(&self) -> error::Result<MutexGuard<'_, Vec<Document>>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("Test repository lock poisoned").code(500))
    }

    fn violates_unique(&self, db: &[Document], candidate: &Document) -> bool {
        let id = candidate.get_object_id("id").ok();
        self.unique.iter().any(|field| match candidate.get(field) {
            None | Some(Bson::Null) => false,
            Some(value) => db
                .iter()
                .filter(|other| other.get_object_id("id").ok() != id)
                .any(|other| other.get(field) == Some(value)),
        })
    }
}

pub fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$or" => as_documents(condition)
            .into_iter()
            .any(|filter| matches(document, filter)),
        "$and" => as_documents(condition)
            .into_iter()
            .all(|filter| matches(document, filter)),
        _ => field_matches(document.get(key), condition),
    })
}

fn as_documents(value: &Bson) -> Vec<&Document> {
    match value {
        Bson::Array(items) => items.iter().filter_map(Bson::as_document).collect(),
        _ => Vec::new(),
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> bool {
    match condition {
        Bson::Document(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => ops
            .iter()
            .all(|(op, arg)| operator_matches(value, op, arg, ops)),
        _ => equals(value, condition),
    }
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.contains(expected)
        }
        Some(value) => value == expected,
        None => expected == &Bson::Null,
    }
}

fn operator_matches(value: Option<&Bson>, op: &str, arg: &Bson, ops: &Document) -> bool {
    match op {
        "$regex" => {
            let Some(pattern) = arg.as_str() else {
                return false;
            };
            let options = ops.get_str("$options").unwrap_or("");
            let Ok(regex) = RegexBuilder::new(pattern)
                .case_insensitive(options.contains('i'))
                .build()
            else {
                return false;
            };
            match value {
                Some(Bson::String(text)) => regex.is_match(text),
                Some(Bson::Array(items)) => items
                    .iter()
                    .filter_map(Bson::as_str)
                    .any(|text| regex.is_match(text)),
                _ => false,
            }
        }
        "$options" => true,
        "$in" => match arg {
            Bson::Array(items) => items.iter().any(|item| equals(value, item)),
            _ => false,
        },
        "$nin" => match arg {
            Bson::Array(items) => !items.iter().any(|item| equals(value, item)),
            _ => false,
        },
        "$ne" => !equals(value, arg),
        "$exists" => arg.as_bool().unwrap_or(true) == value.is_some(),
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let Some(ordering) = value.and_then(|value| compare(value, arg)) else {
                return false;
            };
            match op {
                "$gt" => ordering == Ordering::Greater,
                "$gte" => ordering != Ordering::Less,
                "$lt" => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }
        }
        _ => false,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        _ => as_f64(left)?.partial_cmp(&as_f64(right)?),
    }
}

fn increment(current: Option<&Bson>, by: &Bson) -> error::Result<Bson> {
    let Some(current) = current else {
        return Ok(by.clone());
    };
    let result = match (current, by) {
        (Bson::Int32(a), Bson::Int32(b)) => Bson::Int32(a + b),
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(a + b),
        (Bson::Int32(a), Bson::Int64(b)) | (Bson::Int64(b), Bson::Int32(a)) => {
            Bson::Int64(*a as i64 + b)
        }
        _ => match (as_f64(current), as_f64(by)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => return Err(anyhow::anyhow!("Cannot increment non-numeric field").code(500)),
        },
    };
    Ok(result)
}

fn array_field<'a>(document: &'a mut Document, field: &str) -> error::Result<&'a mut Vec<Bson>> {
    if !document.contains_key(field) {
        document.insert(field, Bson::Array(Vec::new()));
    }
    match document.get_mut(field) {
        Some(Bson::Array(items)) => Ok(items),
        _ => Err(anyhow::anyhow!("Field {} is not an array", field).code(500)),
    }
}

fn each(value: &Bson) -> Vec<Bson> {
    match value {
        Bson::Document(inner) => match inner.get("$each") {
            Some(Bson::Array(items)) => items.clone(),
            _ => vec![value.clone()],
        },
        _ => vec![value.clone()],
    }
}

pub fn apply_update(document: &mut Document, update: &Document) -> error::Result<()> {
    for (op, fields) in update {
        let Some(fields) = fields.as_document() else {
            return Err(anyhow::anyhow!("Update operator {} expects a document", op).code(500));
        };
        for (field, value) in fields {
            match op.as_str() {
                "$set" => {
                    document.insert(field.clone(), value.clone());
                }
                "$unset" => {
                    document.remove(field);
                }
                "$inc" => {
                    let next = increment(document.get(field), value)?;
                    document.insert(field.clone(), next);
                }
                "$push" => array_field(document, field)?.extend(each(value)),
                "$addToSet" => {
                    let items = array_field(document, field)?;
                    for value in each(value) {
                        if !items.contains(&value) {
                            items.push(value);
                        }
                    }
                }
                _ => {
                    return Err(anyhow::anyhow!("Unsupported update operator {}", op).code(500))
                }
            }
        }
    }
    Ok(())
}

fn created_at(document: &Document) -> i64 {
    document.get_i64("createdAt").unwrap_or_default()
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Entity + Serialize + DeserializeOwned + Send + Sync,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let mut db = self.lock()?;

        let id = item.id();
        if db.iter().any(|x| x.get_object_id("id").ok() == Some(id)) {
            return Ok(false);
        }

        let document = bson::to_document(item)?;
        if self.violates_unique(&db, &document) {
            return Err(anyhow::anyhow!("Record already exists").code(409));
        }

        db.push(document);
        Ok(true)
    }

    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>> {
        let db = self.lock()?;
        let found = db.iter().find(|x| equals(x.get(field), value)).cloned();
        Ok(found.map(bson::from_document).transpose()?)
    }

    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>> {
        self.query(doc! {field: value.clone()}).await
    }

    async fn query(&self, filter: Document) -> error::Result<Vec<T>> {
        let db = self.lock()?;
        let mut found: Vec<Document> = db
            .iter()
            .rev()
            .filter(|x| matches(x, &filter))
            .cloned()
            .collect();
        found.sort_by_key(|x| Reverse(created_at(x)));

        Ok(found
            .into_iter()
            .map(bson::from_document)
            .collect::<Result<_, _>>()?)
    }

    async fn update(&self, id: &ObjectId, update: Document) -> error::Result<Option<T>> {
        let mut db = self.lock()?;

        let Some(pos) = db
            .iter()
            .position(|x| x.get_object_id("id").ok().as_ref() == Some(id))
        else {
            return Ok(None);
        };

        let mut document = db[pos].clone();
        apply_update(&mut document, &update)?;

        if self.violates_unique(&db, &document) {
            return Err(anyhow::anyhow!("Record already exists").code(409));
        }

        db[pos] = document.clone();
        Ok(Some(bson::from_document(document)?))
    }

    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>> {
        let mut db = self.lock()?;

        let Some(pos) = db
            .iter()
            .position(|x| x.get_object_id(field).ok().as_ref() == Some(id))
        else {
            return Ok(None);
        };

        let removed = db.remove(pos);
        Ok(Some(bson::from_document(removed)?))
    }

    async fn count(&self, filter: Document) -> error::Result<u64> {
        let db = self.lock()?;
        Ok(db.iter().filter(|x| matches(x, &filter)).count() as u64)
    }
}
