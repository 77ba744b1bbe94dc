use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub token: String,
    pub expires_at: i64,
    pub created_at: i64,
}

impl Entity for ResetToken {
    fn id(&self) -> ObjectId {
        self.id
    }
}
