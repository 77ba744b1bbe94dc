use chrono::Utc;
use common::{
    access_rules::{AccessRules, Edit},
    context::Context,
    entities::{profile::Profile, role::Role, user::User},
    error::{self, bad_request, not_found, AddCode},
    query::change_set,
};
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfile {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChange {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// What a user may change about their own profile. Account fields such
/// as the password, ids, role and activation are not part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyProfileChange {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

pub struct ProfileService {
    context: Context,
}

impl ProfileService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self) -> error::Result<Vec<Profile<String>>> {
        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        Ok(profiles
            .query(doc! {})
            .await?
            .into_iter()
            .map(Profile::stringify)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<Profile<String>> {
        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        let Some(profile) = profiles.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Profile"));
        };

        Ok(profile.stringify())
    }

    pub async fn create(&self, data: CreateProfile) -> error::Result<Profile<String>> {
        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        let Some(username) = data.username.filter(|name| !name.trim().is_empty()) else {
            return Err(bad_request("Username is required"));
        };

        let now = Utc::now().timestamp_micros();
        let profile = Profile {
            id: ObjectId::new(),
            user_id: data.user_id,
            username,
            first_name: data.first_name.unwrap_or_default(),
            last_name: data.last_name.unwrap_or_default(),
            email: data.email,
            badge_number: data.badge_number,
            department: data.department,
            position: data.position,
            phone: data.phone,
            role: data.role.unwrap_or_default(),
            is_active: data.is_active.unwrap_or(true),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        profiles.insert(&profile).await?;

        Ok(profile.stringify())
    }

    pub async fn change(
        &self,
        id: ObjectId,
        change: ProfileChange,
    ) -> error::Result<Profile<String>> {
        let auth = self.context.auth();
        auth.require_user()?;

        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        let Some(profile) = profiles.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Profile"));
        };

        if !Edit.get_access(auth, &profile) {
            return Err(anyhow::anyhow!("User is not available to change this profile").code(403));
        }

        if !auth.full_access() && (change.role.is_some() || change.is_active.is_some()) {
            return Err(anyhow::anyhow!("Only administrators can change role or status").code(403));
        }

        let Some(profile) = profiles.update(&id, change_set(&change)?).await? else {
            return Err(not_found("Profile"));
        };

        Ok(profile.stringify())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<Profile<String>> {
        let auth = self.context.auth();
        auth.require_user()?;

        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        let Some(profile) = profiles.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("Profile"));
        };

        if !Edit.get_access(auth, &profile) {
            return Err(anyhow::anyhow!("User is not available to delete this profile").code(403));
        }

        let Some(profile) = profiles.delete("id", &id).await? else {
            return Err(not_found("Profile"));
        };

        Ok(profile.stringify())
    }

    /// The session user's profile, created from the account on first use.
    async fn my_profile_inner(&self) -> error::Result<Profile<ObjectId>> {
        let session = self.context.auth().require_user()?;
        let user_id = session.user_id()?;

        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        if let Some(profile) = profiles
            .find("userId", &Bson::String(user_id.to_hex()))
            .await?
        {
            return Ok(profile);
        }

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(user_id)).await? else {
            return Err(not_found("User profile"));
        };

        let profile = Profile::for_user(&user, Utc::now().timestamp_micros());
        profiles.insert(&profile).await?;
        log::info!("Created profile for {}", user.username);

        Ok(profile)
    }

    pub async fn my_profile(&self) -> error::Result<Profile<String>> {
        Ok(self.my_profile_inner().await?.stringify())
    }

    pub async fn change_my_profile(
        &self,
        change: MyProfileChange,
    ) -> error::Result<Profile<String>> {
        let profile = self.my_profile_inner().await?;

        let profiles = self.context.try_get_repository::<Profile<ObjectId>>()?;

        let Some(profile) = profiles.update(&profile.id, change_set(&change)?).await? else {
            return Err(not_found("Profile"));
        };

        Ok(profile.stringify())
    }
}
