use actix_web::cookie::{time::Duration, Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use mongodb::bson::oid::ObjectId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{role::Role, user::User},
    error::{self, AddCode},
};

pub const SESSION_COOKIE: &str = "police.sid";
pub const SESSION_HOURS: i64 = 24;

const DEFAULT_SESSION_SECRET: &str = "police-system-secret-key-2025";

pub static SESSION_SECRET: Lazy<String> = Lazy::new(|| match std::env::var("SESSION_SECRET") {
    Ok(secret) if !secret.is_empty() => secret,
    _ => {
        log::warn!("SESSION_SECRET is not set, falling back to the built-in development secret");
        DEFAULT_SESSION_SECRET.to_string()
    }
});

pub static ENCODING_KEY: Lazy<EncodingKey> =
    Lazy::new(|| EncodingKey::from_secret(SESSION_SECRET.as_bytes()));

pub static DECODING_KEY: Lazy<DecodingKey> =
    Lazy::new(|| DecodingKey::from_secret(SESSION_SECRET.as_bytes()));

/// What the signed session cookie carries about the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl Session {
    pub fn user_id(&self) -> error::Result<ObjectId> {
        self.id
            .parse()
            .map_err(|_| anyhow::anyhow!("Session carries a malformed user id").code(401))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl From<&User<ObjectId>> for Session {
    fn from(user: &User<ObjectId>) -> Self {
        Session {
            id: user.id.to_hex(),
            username: user.username.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: Session,
    exp: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
    Admin(Session),
    User(Session),
    None,
}

impl Auth {
    pub fn from_session(session: Session) -> Self {
        match session.role {
            Role::Admin => Auth::Admin(session),
            Role::User => Auth::User(session),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Auth::Admin(session) | Auth::User(session) => Some(session),
            Auth::None => None,
        }
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.session().and_then(|session| session.user_id().ok())
    }

    pub fn full_access(&self) -> bool {
        matches!(self, Auth::Admin(_))
    }

    pub fn require_user(&self) -> error::Result<&Session> {
        self.session()
            .ok_or_else(|| anyhow::anyhow!("Authentication required").code(401))
    }

    pub fn require_admin(&self) -> error::Result<&Session> {
        let session = self.require_user()?;
        if !self.full_access() {
            return Err(anyhow::anyhow!("Admin access required").code(403));
        }
        Ok(session)
    }

    pub fn to_token(&self) -> error::Result<String> {
        let Some(session) = self.session() else {
            return Err(anyhow::anyhow!("Cannot issue a session without a user").code(500));
        };

        let exp = Utc::now() + chrono::Duration::hours(SESSION_HOURS);
        let claims = Claims {
            session: session.clone(),
            exp: exp.timestamp() as usize,
        };

        Ok(encode(&Header::new(Algorithm::HS512), &claims, &ENCODING_KEY)?)
    }

    /// `Ok(None)` when the token is well-formed but expired.
    pub fn from_token(token: &str) -> error::Result<Option<Self>> {
        let validation = Validation::new(Algorithm::HS512);

        match decode::<Claims>(token, &DECODING_KEY, &validation) {
            Ok(data) => Ok(Some(Auth::from_session(data.claims.session))),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Invalid session token: {}", err).code(401)),
        }
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(SESSION_HOURS))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            id: ObjectId::new().to_hex(),
            username: "jdoe".to_string(),
            role,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn test_token_restores_role() {
        let token = Auth::from_session(session(Role::Admin)).to_token().unwrap();
        let auth = Auth::from_token(&token).unwrap().unwrap();
        assert!(auth.full_access());
        assert_eq!(auth.session().unwrap().username, "jdoe");
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let mut token = Auth::from_session(session(Role::User)).to_token().unwrap();
        token.push('x');
        let err = Auth::from_token(&token).unwrap_err();
        assert_eq!(err.code, 401);
    }

    #[test]
    fn test_user_is_not_admin() {
        let auth = Auth::from_session(session(Role::User));
        assert!(auth.require_user().is_ok());
        assert_eq!(auth.require_admin().unwrap_err().code, 403);
        assert_eq!(Auth::None.require_user().unwrap_err().code, 401);
    }

    #[test]
    fn test_removal_cookie_expires() {
        let cookie = expired_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
