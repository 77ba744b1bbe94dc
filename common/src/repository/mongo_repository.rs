use async_trait::async_trait;
use futures::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode, ServiceError};

use super::{Entity, Repository};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoRepository<T> {
    pub collection: mongodb::Collection<T>,
}

impl<T> MongoRepository<T> {
    pub fn new(database: &Database, collection: &str) -> Self {
        let collection = database.collection(collection);
        Self { collection }
    }

    pub async fn unique_index(self, fields: &[&str]) -> error::Result<Self> {
        for field in fields {
            let index = IndexModel::builder()
                .keys(doc! { *field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection.create_index(index, None).await?;
        }
        Ok(self)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn write_error(err: mongodb::error::Error) -> ServiceError {
    if is_duplicate_key(&err) {
        return anyhow::anyhow!("Record already exists").code(409);
    }
    err.into()
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Entity + Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let result = self
            .collection
            .find_one(doc! {"id": item.id()}, None)
            .await?
            .is_none();

        if result {
            self.collection
                .insert_one(item, None)
                .await
                .map_err(write_error)?;
        }
        Ok(result)
    }

    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>> {
        let result = self.collection.find_one(doc! {field: value}, None).await?;
        Ok(result)
    }

    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>> {
        self.query(doc! {field: value}).await
    }

    async fn query(&self, filter: Document) -> error::Result<Vec<T>> {
        let find_options = FindOptions::builder()
            .sort(doc! {"createdAt": -1})
            .build();

        let results: Vec<mongodb::error::Result<T>> = self
            .collection
            .find(filter, find_options)
            .await?
            .collect()
            .await;

        Ok(results.into_iter().collect::<mongodb::error::Result<_>>()?)
    }

    async fn update(&self, id: &ObjectId, update: Document) -> error::Result<Option<T>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(doc! {"id": id}, update, options)
            .await
            .map_err(write_error)?;

        Ok(result)
    }

    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>> {
        let result = self
            .collection
            .find_one_and_delete(doc! {field: id}, None)
            .await?;
        Ok(result)
    }

    async fn count(&self, filter: Document) -> error::Result<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }
}
