use actix_web::{
    get, post,
    web::{self, Json},
    HttpResponse,
};
use common::{
    auth::{expired_session_cookie, session_cookie},
    context::Context,
    error,
};
use serde_json::json;

use crate::service::{
    auth::{AuthService, ForgotPassword, Login, ResetPassword},
    user::CreateUser,
};

#[post("/api/auth/login")]
pub async fn login(context: Context, Json(data): web::Json<Login>) -> error::Result<HttpResponse> {
    let logged_in = AuthService::new(context).login(data).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(logged_in.token))
        .json(json!({ "message": "Login successful", "user": logged_in.user })))
}

#[post("/api/auth/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(json!({ "message": "Logged out successfully" }))
}

#[get("/api/auth/me")]
pub async fn me(context: Context) -> error::Result<HttpResponse> {
    let user = AuthService::new(context).me().await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

#[post("/api/auth/register")]
pub async fn register(
    context: Context,
    Json(data): web::Json<CreateUser>,
) -> error::Result<HttpResponse> {
    let user = AuthService::new(context).register(data).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User registered successfully",
        "user": user,
    })))
}

#[post("/api/auth/forgot-password")]
pub async fn forgot_password(
    context: Context,
    Json(data): web::Json<ForgotPassword>,
) -> error::Result<HttpResponse> {
    let token = AuthService::new(context).forgot_password(data).await?;

    let message = "If an account with that username exists, a password reset token has been issued";
    Ok(match token {
        Some(token) => HttpResponse::Ok().json(json!({ "message": message, "resetToken": token })),
        None => HttpResponse::Ok().json(json!({ "message": message })),
    })
}

#[post("/api/auth/reset-password")]
pub async fn reset_password(
    context: Context,
    Json(data): web::Json<ResetPassword>,
) -> error::Result<HttpResponse> {
    AuthService::new(context).reset_password(data).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password has been reset successfully" })))
}
