use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

use super::{role::Role, user::User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile<Id> {
    pub id: Id,
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    pub last_login_at: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Profile<ObjectId> {
    pub fn stringify(self) -> Profile<String> {
        Profile {
            id: self.id.to_hex(),
            user_id: self.user_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            badge_number: self.badge_number,
            department: self.department,
            position: self.position,
            phone: self.phone,
            role: self.role,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Seeds a profile from the account it belongs to.
    pub fn for_user(user: &User<ObjectId>, now: i64) -> Self {
        Profile {
            id: ObjectId::new(),
            user_id: Some(user.id.to_hex()),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: Some(user.email.clone()),
            badge_number: user.badge_number.clone(),
            department: Some(
                user.department
                    .clone()
                    .unwrap_or_else(|| "Police Department".to_string()),
            ),
            position: Some(
                user.position
                    .clone()
                    .unwrap_or_else(|| "Officer".to_string()),
            ),
            phone: user.phone.clone(),
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Profile<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
