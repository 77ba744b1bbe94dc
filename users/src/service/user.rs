use chrono::Utc;
use common::{
    access_rules::{AccessRules, Edit, Read},
    context::Context,
    entities::{
        role::Role,
        user::{PublicUser, User},
    },
    error::{self, bad_request, not_found, AddCode},
    password,
    query::{change_set, present},
    repository::RepositoryObject,
};
use lazy_static::lazy_static;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PROTECTED_USERNAME: &str = "admin";

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChange {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub fn validate_password(password: &str) -> error::Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(bad_request(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> error::Result<()> {
    if !EMAIL.is_match(email) {
        return Err(bad_request("Please provide a valid email address"));
    }
    Ok(())
}

/// Validates a new account and hashes its password.
pub fn build_user(data: CreateUser) -> error::Result<User<ObjectId>> {
    let (Some(username), Some(email), Some(password), Some(first_name), Some(last_name)) = (
        present(data.username),
        present(data.email),
        data.password.filter(|password| !password.is_empty()),
        present(data.first_name),
        present(data.last_name),
    ) else {
        return Err(bad_request(
            "Username, email, password, first name and last name are required",
        ));
    };

    validate_password(&password)?;
    validate_email(&email)?;

    let now = Utc::now().timestamp_micros();

    Ok(User {
        id: ObjectId::new(),
        username,
        email,
        password: password::hash(&password)?,
        first_name,
        last_name,
        badge_number: data.badge_number,
        department: data.department,
        position: data.position,
        phone: data.phone,
        role: data.role.unwrap_or_default(),
        is_active: true,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    })
}

/// Inserts after checking both unique keys so the caller learns which one
/// collided. The unique indexes still guard concurrent inserts.
pub async fn insert_unique(
    users: &RepositoryObject<User<ObjectId>>,
    user: &User<ObjectId>,
) -> error::Result<()> {
    if users
        .find("username", &Bson::String(user.username.clone()))
        .await?
        .is_some()
    {
        return Err(anyhow::anyhow!("Username already exists").code(409));
    }

    if users
        .find("email", &Bson::String(user.email.clone()))
        .await?
        .is_some()
    {
        return Err(anyhow::anyhow!("Email already exists").code(409));
    }

    users.insert(user).await?;
    Ok(())
}

pub struct UserService {
    context: Context,
}

impl UserService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn find_all(&self) -> error::Result<Vec<PublicUser>> {
        self.context.auth().require_admin()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        Ok(users
            .query(doc! {})
            .await?
            .into_iter()
            .map(PublicUser::from)
            .collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<PublicUser> {
        let auth = self.context.auth();
        auth.require_user()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("User"));
        };

        if !Read.get_access(auth, &user) {
            return Err(anyhow::anyhow!("User is not available to view this account").code(403));
        }

        Ok(user.into())
    }

    pub async fn create(&self, data: CreateUser) -> error::Result<PublicUser> {
        self.context.auth().require_admin()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let user = build_user(data)?;
        insert_unique(&users, &user).await?;

        log::info!("Created user {}", user.username);
        Ok(user.into())
    }

    pub async fn change(&self, id: ObjectId, mut change: UserChange) -> error::Result<PublicUser> {
        let auth = self.context.auth();
        auth.require_user()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("User"));
        };

        if !Edit.get_access(auth, &user) {
            return Err(anyhow::anyhow!("User is not available to change this account").code(403));
        }

        if let Some(email) = &change.email {
            validate_email(email)?;
        }

        if let Some(new_password) = change.password.take() {
            validate_password(&new_password)?;
            change.password = Some(password::hash(&new_password)?);
        }

        let Some(user) = users.update(&id, change_set(&change)?).await? else {
            return Err(not_found("User"));
        };

        Ok(user.into())
    }

    pub async fn delete(&self, id: ObjectId) -> error::Result<PublicUser> {
        self.context.auth().require_admin()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("User"));
        };

        if user.username == PROTECTED_USERNAME {
            return Err(bad_request("Cannot delete admin account"));
        }

        let Some(user) = users.delete("id", &id).await? else {
            return Err(not_found("User"));
        };

        log::info!("Deleted user {}", user.username);
        Ok(user.into())
    }
}

/// Creates the built-in administrator when no account carries its username.
/// Returns whether an account was created.
pub async fn ensure_admin(
    users: &RepositoryObject<User<ObjectId>>,
    password: &str,
) -> error::Result<bool> {
    if users
        .find("username", &Bson::String(PROTECTED_USERNAME.to_string()))
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let user = build_user(CreateUser {
        username: Some(PROTECTED_USERNAME.to_string()),
        email: Some("admin@police.local".to_string()),
        password: Some(password.to_string()),
        first_name: Some("System".to_string()),
        last_name: Some("Administrator".to_string()),
        department: Some("Administration".to_string()),
        position: Some("Administrator".to_string()),
        role: Some(Role::Admin),
        ..Default::default()
    })?;

    users.insert(&user).await?;
    Ok(true)
}
