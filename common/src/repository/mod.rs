pub mod mongo_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use crate::error;

pub trait Entity {
    fn id(&self) -> ObjectId;
}

/// Storage seam for every collection. Filters and updates are plain
/// MongoDB documents so the in-memory implementation can evaluate the
/// same queries the driver would receive.
#[async_trait]
pub trait Repository<T> {
    async fn insert(&self, item: &T) -> error::Result<bool>;
    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>>;
    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>>;
    /// Newest first, ordered by `createdAt`.
    async fn query(&self, filter: Document) -> error::Result<Vec<T>>;
    /// Applies an update document to the item with the given id and
    /// returns the item as stored afterwards.
    async fn update(&self, id: &ObjectId, update: Document) -> error::Result<Option<T>>;
    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>>;
    async fn count(&self, filter: Document) -> error::Result<u64>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T> + Send + Sync>;
