use chrono::{Duration, Utc};
use common::{
    auth::{Auth, Session},
    context::Context,
    entities::{
        reset_token::ResetToken,
        role::Role,
        user::{PublicUser, User},
    },
    error::{self, bad_request, not_found, AddCode},
    password::{self, Verification},
};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::user::{build_user, insert_unique, validate_password, CreateUser};

const RESET_TOKEN_BYTES: usize = 32;
const RESET_TOKEN_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPassword {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetPassword {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

pub struct LoggedIn {
    pub user: PublicUser,
    pub token: String,
}

pub struct AuthService {
    context: Context,
}

fn reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

impl AuthService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn login(&self, login: Login) -> error::Result<LoggedIn> {
        if login.username.trim().is_empty() || login.password.is_empty() {
            return Err(bad_request("Username and password are required"));
        }

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users
            .find("username", &Bson::String(login.username.trim().to_string()))
            .await?
        else {
            return Err(anyhow::anyhow!("Invalid credentials").code(401));
        };

        let rehashed = match password::verify(&login.password, &user.password) {
            Verification::Invalid => {
                return Err(anyhow::anyhow!("Invalid credentials").code(401));
            }
            Verification::Valid => None,
            Verification::ValidLegacy => {
                log::info!("Replacing plaintext password of {} with a hash", user.username);
                Some(password::hash(&login.password)?)
            }
        };

        if !user.is_active {
            return Err(anyhow::anyhow!("Account is deactivated").code(403));
        }

        let now = Utc::now().timestamp_micros();
        let mut set = doc! {"lastLoginAt": now, "updatedAt": now};
        if let Some(hash) = rehashed {
            set.insert("password", hash);
        }

        let Some(user) = users.update(&user.id, doc! {"$set": set}).await? else {
            return Err(not_found("User"));
        };

        let token = Auth::from_session(Session::from(&user)).to_token()?;
        log::info!("User {} logged in", user.username);

        Ok(LoggedIn {
            user: user.into(),
            token,
        })
    }

    pub async fn me(&self) -> error::Result<PublicUser> {
        let session = self.context.auth().require_user()?;
        let id = session.user_id()?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(not_found("User"));
        };

        if !user.is_active {
            return Err(anyhow::anyhow!("Account is deactivated").code(403));
        }

        Ok(user.into())
    }

    pub async fn register(&self, data: CreateUser) -> error::Result<PublicUser> {
        if data.role == Some(Role::Admin) && !self.context.auth().full_access() {
            return Err(anyhow::anyhow!("Only administrators can create admin accounts").code(403));
        }

        let user = build_user(data)?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;
        insert_unique(&users, &user).await?;

        log::info!("Registered user {}", user.username);
        Ok(user.into())
    }

    /// Issues a reset token for a known username. `None` for unknown ones so
    /// the handler can answer the same way in both cases.
    pub async fn forgot_password(&self, data: ForgotPassword) -> error::Result<Option<String>> {
        if data.username.trim().is_empty() {
            return Err(bad_request("Username is required"));
        }

        let users = self.context.try_get_repository::<User<ObjectId>>()?;
        let tokens = self.context.try_get_repository::<ResetToken>()?;

        let Some(user) = users
            .find("username", &Bson::String(data.username.trim().to_string()))
            .await?
        else {
            log::info!("Password reset requested for unknown user");
            return Ok(None);
        };

        let now = Utc::now();
        let token = ResetToken {
            id: ObjectId::new(),
            user_id: user.id,
            token: reset_token(),
            expires_at: (now + Duration::hours(RESET_TOKEN_HOURS)).timestamp_micros(),
            created_at: now.timestamp_micros(),
        };

        tokens.insert(&token).await?;
        log::info!("Issued password reset token for {}", user.username);

        Ok(Some(token.token))
    }

    pub async fn reset_password(&self, data: ResetPassword) -> error::Result<()> {
        if data.token.is_empty() || data.password.is_empty() {
            return Err(bad_request("Token and new password are required"));
        }
        validate_password(&data.password)?;

        let users = self.context.try_get_repository::<User<ObjectId>>()?;
        let tokens = self.context.try_get_repository::<ResetToken>()?;

        let Some(token) = tokens.find("token", &Bson::String(data.token)).await? else {
            return Err(bad_request("Invalid or expired reset token"));
        };

        tokens.delete("id", &token.id).await?;

        if token.expires_at < Utc::now().timestamp_micros() {
            return Err(bad_request("Invalid or expired reset token"));
        }

        let mut set = Document::new();
        set.insert("password", password::hash(&data.password)?);
        set.insert("updatedAt", Utc::now().timestamp_micros());

        if users.update(&token.user_id, doc! {"$set": set}).await?.is_none() {
            return Err(bad_request("Invalid or expired reset token"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::{
        context::{HandlerContext, ServiceState},
        repository::RepositoryObject,
        storage::UploadStorage,
    };

    use super::*;

    fn anonymous(state: &Arc<ServiceState>) -> Context {
        Context(
            Arc::clone(state),
            HandlerContext {
                user_auth: Auth::None,
            },
        )
    }

    #[actix_web::test]
    async fn test_plaintext_password_is_rehashed_on_login() {
        let state = Arc::new(ServiceState::in_memory(UploadStorage::new(
            std::env::temp_dir().join("police-users"),
        )));
        let users = state
            .repositories
            .get::<RepositoryObject<User<ObjectId>>>()
            .cloned()
            .unwrap();

        let now = Utc::now().timestamp_micros();
        let legacy = User {
            id: ObjectId::new(),
            username: "legacy".to_string(),
            email: "legacy@police.local".to_string(),
            password: "plain-old".to_string(),
            first_name: "Old".to_string(),
            last_name: "Timer".to_string(),
            badge_number: None,
            department: None,
            position: None,
            phone: None,
            role: Role::User,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(&legacy).await.unwrap();

        let logged_in = AuthService::new(anonymous(&state))
            .login(Login {
                username: "legacy".to_string(),
                password: "plain-old".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.username, "legacy");

        let stored = users
            .find("id", &Bson::ObjectId(legacy.id))
            .await
            .unwrap()
            .unwrap();
        assert!(password::is_hashed(&stored.password));
        assert_eq!(
            password::verify("plain-old", &stored.password),
            Verification::Valid
        );

        let err = AuthService::new(anonymous(&state))
            .login(Login {
                username: "legacy".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, 401);
    }
}
