use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::profile::{CreateProfile, MyProfileChange, ProfileChange, ProfileService};

#[get("/api/profiles")]
pub async fn get_profiles(context: Context) -> error::Result<HttpResponse> {
    let profiles = ProfileService::new(context).find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "profiles": profiles })))
}

#[get("/api/profiles/{id}")]
pub async fn get_profile(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let profile = ProfileService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "profile": profile })))
}

#[post("/api/profiles")]
pub async fn post_profile(
    context: Context,
    Json(data): web::Json<CreateProfile>,
) -> error::Result<HttpResponse> {
    let profile = ProfileService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "profile": profile })))
}

#[put("/api/profiles/{id}")]
pub async fn put_profile(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<ProfileChange>,
) -> error::Result<HttpResponse> {
    let profile = ProfileService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "profile": profile })))
}

#[delete("/api/profiles/{id}")]
pub async fn delete_profile(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    ProfileService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Profile deleted successfully" })))
}

#[get("/api/profile")]
pub async fn my_profile(context: Context) -> error::Result<HttpResponse> {
    let profile = ProfileService::new(context).my_profile().await?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}

#[put("/api/profile")]
pub async fn put_my_profile(
    context: Context,
    Json(data): web::Json<MyProfileChange>,
) -> error::Result<HttpResponse> {
    let profile = ProfileService::new(context).change_my_profile(data).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
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
    async fn test_profile_is_created_on_first_visit() {
        let app = init_service(create_test_app().await).await;
        register_user(&app, "jdoe", "jdoe@police.local").await;
        let cookie = login_cookie(&app, "jdoe", "secret1").await;

        let req = test::TestRequest::get()
            .uri("/api/profile")
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["username"], "jdoe");
        assert_eq!(body["user"]["department"], "Police Department");
        assert_eq!(body["user"]["position"], "Officer");
        let id = body["user"]["id"].clone();

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .cookie(cookie.clone())
            .set_json(json!({"phone": "555-0100", "role": "admin"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["id"], id);
        assert_eq!(body["user"]["phone"], "555-0100");
        assert_eq!(body["user"]["role"], "user");

        let req = test::TestRequest::get()
            .uri("/api/profiles")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profiles"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_profile_requires_session() {
        let app = init_service(create_test_app().await).await;

        let req = test::TestRequest::get().uri("/api/profile").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_only_owner_or_admin_changes_profile() {
        let app = init_service(create_test_app().await).await;
        register_user(&app, "jdoe", "jdoe@police.local").await;
        register_user(&app, "asmith", "asmith@police.local").await;

        let owner = login_cookie(&app, "jdoe", "secret1").await;
        let req = test::TestRequest::get()
            .uri("/api/profile")
            .cookie(owner.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["user"]["id"].as_str().unwrap().to_string();

        let other = login_cookie(&app, "asmith", "secret1").await;
        let req = test::TestRequest::put()
            .uri(&format!("/api/profiles/{}", id))
            .cookie(other)
            .set_json(json!({"position": "Chief"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/api/profiles/{}", id))
            .cookie(owner.clone())
            .set_json(json!({"isActive": false}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let admin = login_cookie(&app, "admin", "admin123").await;
        let req = test::TestRequest::put()
            .uri(&format!("/api/profiles/{}", id))
            .cookie(admin.clone())
            .set_json(json!({"position": "Detective"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profile"]["position"], "Detective");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/profiles/{}", id))
            .cookie(admin.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/profiles/{}", id))
            .cookie(admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_create_profile_requires_username() {
        let app = init_service(create_test_app().await).await;

        let req = test::TestRequest::post()
            .uri("/api/profiles")
            .set_json(json!({"firstName": "No", "lastName": "Name"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/profiles")
            .set_json(json!({"username": "walkin", "firstName": "Walk", "lastName": "In"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["profile"]["isActive"], true);
        assert_eq!(body["profile"]["role"], "user");
    }
}
