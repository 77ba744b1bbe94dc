use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::user::{CreateUser, UserChange, UserService};

#[get("/api/users")]
pub async fn get_users(context: Context) -> error::Result<HttpResponse> {
    let users = UserService::new(context).find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[get("/api/users/{id}")]
pub async fn get_user(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let user = UserService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

#[post("/api/users")]
pub async fn post_user(
    context: Context,
    Json(data): web::Json<CreateUser>,
) -> error::Result<HttpResponse> {
    let user = UserService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "user": user })))
}

#[put("/api/users/{id}")]
pub async fn put_user(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<UserChange>,
) -> error::Result<HttpResponse> {
    let user = UserService::new(context).change(parse_id(&id)?, data).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

#[delete("/api/users/{id}")]
pub async fn delete_user(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    UserService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, init_service},
    };
    use serde_json::{json, Value};

    use crate::tests::{create_test_app, login_cookie, register_user};

    #[actix_web::test]
    async fn test_users_require_admin() {
        let app = init_service(create_test_app().await).await;

        let req = test::TestRequest::get().uri("/api/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        register_user(&app, "jdoe", "jdoe@police.local").await;
        let cookie = login_cookie(&app, "jdoe", "secret1").await;

        let req = test::TestRequest::get()
            .uri("/api/users")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_admin_manages_users() {
        let app = init_service(create_test_app().await).await;
        let admin = login_cookie(&app, "admin", "admin123").await;

        let req = test::TestRequest::post()
            .uri("/api/users")
            .cookie(admin.clone())
            .set_json(json!({
                "username": "sgt", "email": "sgt@police.local", "password": "secret1",
                "firstName": "Sam", "lastName": "Grant", "badgeNumber": "B-101",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["user"]["id"].as_str().unwrap().to_string();
        assert!(body["user"].get("password").is_none());

        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{}", id))
            .cookie(admin.clone())
            .set_json(json!({"position": "Sergeant"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["position"], "Sergeant");
        assert_eq!(body["user"]["badgeNumber"], "B-101");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/users/{}", id))
            .cookie(admin.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "User deleted successfully");

        let req = test::TestRequest::get()
            .uri(&format!("/api/users/{}", id))
            .cookie(admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_admin_account_cannot_be_deleted() {
        let app = init_service(create_test_app().await).await;
        let admin = login_cookie(&app, "admin", "admin123").await;

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(admin.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["user"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/users/{}", id))
            .cookie(admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Cannot delete admin account");
    }

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request() {
        let app = init_service(create_test_app().await).await;
        let admin = login_cookie(&app, "admin", "admin123").await;

        let req = test::TestRequest::get()
            .uri("/api/users/not-an-id")
            .cookie(admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
