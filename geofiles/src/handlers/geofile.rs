use actix_multipart::Multipart;
use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{context::Context, error, query::parse_id};
use serde_json::json;

use crate::service::geofile::{
    AddTags, CreateGeofile, GeofileChange, GeofileFilter, GeofileService, LocationQuery,
};

#[get("/api/geofiles")]
pub async fn get_geofiles(
    context: Context,
    filter: web::Query<GeofileFilter>,
) -> error::Result<HttpResponse> {
    let geofiles = GeofileService::new(context)
        .find_all(filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "geofiles": geofiles })))
}

#[get("/api/geofiles/stats/summary")]
pub async fn get_geofile_stats(context: Context) -> error::Result<HttpResponse> {
    let stats = GeofileService::new(context).stats().await?;
    Ok(HttpResponse::Ok().json(json!({ "stats": stats })))
}

#[get("/api/geofiles/search/by-location")]
pub async fn search_geofiles_by_location(
    context: Context,
    query: web::Query<LocationQuery>,
) -> error::Result<HttpResponse> {
    let geofiles = GeofileService::new(context)
        .search_by_location(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "geofiles": geofiles })))
}

#[get("/api/geofiles/{id}")]
pub async fn get_geofile(context: Context, id: web::Path<String>) -> error::Result<HttpResponse> {
    let geofile = GeofileService::new(context).find(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "geofile": geofile })))
}

#[post("/api/geofiles")]
pub async fn post_geofile(
    context: Context,
    Json(data): web::Json<CreateGeofile>,
) -> error::Result<HttpResponse> {
    let geofile = GeofileService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({ "geofile": geofile })))
}

#[post("/api/geofiles/upload")]
pub async fn upload_geofile(context: Context, payload: Multipart) -> error::Result<HttpResponse> {
    let geofile = GeofileService::new(context).upload(payload).await?;

    Ok(HttpResponse::Created().json(json!({
        "geofile": geofile,
        "message": "Geofile uploaded successfully",
    })))
}

#[put("/api/geofiles/{id}")]
pub async fn put_geofile(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<GeofileChange>,
) -> error::Result<HttpResponse> {
    let geofile = GeofileService::new(context)
        .change(parse_id(&id)?, data)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "geofile": geofile })))
}

#[delete("/api/geofiles/{id}")]
pub async fn delete_geofile(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    GeofileService::new(context).delete(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Geofile deleted successfully" })))
}

#[post("/api/geofiles/{id}/download")]
pub async fn post_geofile_download(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    GeofileService::new(context)
        .increment_download(parse_id(&id)?)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Download recorded successfully" })))
}

#[get("/api/geofiles/{id}/download")]
pub async fn get_geofile_download(
    context: Context,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let download = GeofileService::new(context)
        .increment_download(parse_id(&id)?)
        .await?;
    Ok(HttpResponse::Ok().json(download))
}

#[post("/api/geofiles/{id}/link-case/{case_id}")]
pub async fn link_geofile_case(
    context: Context,
    path: web::Path<(String, String)>,
) -> error::Result<HttpResponse> {
    let (id, case_id) = path.into_inner();
    let geofile = GeofileService::new(context)
        .link_case(parse_id(&id)?, case_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Geofile linked to case successfully",
        "geofile": geofile,
    })))
}

#[post("/api/geofiles/{id}/add-tags")]
pub async fn add_geofile_tags(
    context: Context,
    id: web::Path<String>,
    Json(data): web::Json<AddTags>,
) -> error::Result<HttpResponse> {
    let geofile = GeofileService::new(context)
        .add_tags(parse_id(&id)?, data)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tags added successfully",
        "geofile": geofile,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::{header, StatusCode},
        test::{self, init_service},
    };
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    use common::storage::MAX_FIELD_SIZE;

    use crate::{
        service::geofile::MAX_GEOFILE_SIZE,
        tests::{bearer, create_test_app},
    };

    #[actix_web::test]
    async fn test_create_parses_stringified_fields() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/geofiles")
            .set_json(json!({
                "filename": "Downtown Patrol Routes",
                "fileType": "kml",
                "tags": "[\"patrol\",\"night\"]",
                "metadata": "{\"creator\":\"GIS Unit\"}",
                "coordinates": "[-122.4194, 37.7749]",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;

        let geofile = &body["geofile"];
        assert_eq!(geofile["fileType"], "KML");
        assert_eq!(geofile["tags"], json!(["patrol", "night"]));
        assert_eq!(geofile["metadata"]["creator"], "GIS Unit");
        assert_eq!(geofile["coordinates"], json!([-122.4194, 37.7749]));
        assert_eq!(geofile["accessLevel"], "internal");
        assert_eq!(geofile["downloadCount"], 0);
        assert_eq!(geofile["coordinateSystem"], "WGS84");
    }

    #[actix_web::test]
    async fn test_create_validation() {
        let app = init_service(create_test_app()).await;

        for body in [
            json!({"filename": "routes"}),
            json!({"fileType": "kml"}),
            json!({"filename": "routes", "fileType": "exe"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/geofiles")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_filters() {
        let app = init_service(create_test_app()).await;

        for (filename, file_type, access_level, tags, description) in [
            ("Downtown Patrol Routes", "kml", "internal", "patrol,night", "Beat map"),
            ("Harbor Survey", "geojson", "public", "harbor", "Includes patrol boats"),
            ("Crime Hotspots", "csv", "department", "analysis", "Quarterly"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/geofiles")
                .set_json(json!({
                    "filename": filename, "fileType": file_type,
                    "accessLevel": access_level, "tags": tags, "description": description,
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let count = |body: &Value| body["geofiles"].as_array().unwrap().len();

        let req = test::TestRequest::get()
            .uri("/api/geofiles?search=PATROL")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 2);

        let req = test::TestRequest::get()
            .uri("/api/geofiles?fileType=GeoJSON")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 1);
        assert_eq!(body["geofiles"][0]["filename"], "Harbor Survey");

        let req = test::TestRequest::get()
            .uri("/api/geofiles?accessLevel=department")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 1);

        let req = test::TestRequest::get()
            .uri("/api/geofiles?tags=night,analysis")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 2);

        let req = test::TestRequest::get()
            .uri("/api/geofiles?search=p.trol")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 0);

        let req = test::TestRequest::get()
            .uri("/api/geofiles?dateFrom=2000-01-01&dateTo=2000-12-31")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 0);

        let req = test::TestRequest::get().uri("/api/geofiles").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count(&body), 3);
        assert_eq!(body["geofiles"][0]["filename"], "Crime Hotspots");
    }

    #[actix_web::test]
    async fn test_downloads_and_stats() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/geofiles")
            .set_json(json!({
                "filename": "beats.kml", "fileType": "kml",
                "filepath": "/uploads/geofiles/beats.kml", "fileSize": 2048,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["geofile"]["id"].as_str().unwrap().to_string();
        let accessed = body["geofile"]["lastAccessedAt"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/geofiles/{}/download", id))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/geofiles/{}/download", id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "downloadUrl": "/uploads/geofiles/beats.kml",
                "filename": "beats.kml",
                "fileType": "KML",
                "fileSize": 2048,
            })
        );

        let req = test::TestRequest::get()
            .uri(&format!("/api/geofiles/{}", id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geofile"]["downloadCount"], 2);
        assert!(body["geofile"]["lastAccessedAt"].as_i64().unwrap() >= accessed);

        let req = test::TestRequest::get()
            .uri("/api/geofiles/stats/summary")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stats"]["total"], 1);
        assert_eq!(body["stats"]["byFileType"]["KML"], 1);
        assert_eq!(body["stats"]["byAccessLevel"]["internal"], 1);
        assert_eq!(body["stats"]["totalDownloads"], 2);

        let missing = ObjectId::new().to_hex();
        for req in [
            test::TestRequest::get().uri(&format!("/api/geofiles/{}", missing)),
            test::TestRequest::get().uri(&format!("/api/geofiles/{}/download", missing)),
            test::TestRequest::post().uri(&format!("/api/geofiles/{}/download", missing)),
            test::TestRequest::delete().uri(&format!("/api/geofiles/{}", missing)),
        ] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_search_by_location() {
        let app = init_service(create_test_app()).await;

        for (filename, coordinates) in [
            ("near", json!([-122.4100, 37.7749])),
            ("far", json!([-122.3900, 37.7749])),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/geofiles")
                .set_json(json!({"filename": filename, "fileType": "gpx", "coordinates": coordinates}))
                .to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::post()
            .uri("/api/geofiles")
            .set_json(json!({"filename": "nowhere", "fileType": "gpx"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/geofiles/search/by-location?lat=37.7749&lng=-122.4194")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let geofiles = body["geofiles"].as_array().unwrap();
        assert_eq!(geofiles.len(), 1);
        assert_eq!(geofiles[0]["filename"], "near");

        let req = test::TestRequest::get()
            .uri("/api/geofiles/search/by-location?lat=37.7749&lng=-122.4194&radius=5000")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geofiles"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/api/geofiles/search/by-location?lat=37.7749")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_link_and_tags() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/api/geofiles")
            .set_json(json!({"filename": "zones", "fileType": "shp", "tags": ["a"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["geofile"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/geofiles/{}", id))
            .set_json(json!({"accessLevel": "public", "metadata": "{\"layer\":2}"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geofile"]["accessLevel"], "public");
        assert_eq!(body["geofile"]["metadata"]["layer"], 2);
        assert_eq!(body["geofile"]["filename"], "zones");

        let req = test::TestRequest::post()
            .uri(&format!("/api/geofiles/{}/link-case/CASE-2024-ABC123", id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geofile"]["caseId"], "CASE-2024-ABC123");

        let req = test::TestRequest::post()
            .uri(&format!("/api/geofiles/{}/add-tags", id))
            .set_json(json!({"tags": ["a", "b"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geofile"]["tags"], json!(["a", "b"]));

        let req = test::TestRequest::post()
            .uri(&format!("/api/geofiles/{}/add-tags", id))
            .set_json(json!({"tags": "c"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    const BOUNDARY: &str = "----geofile-boundary";

    fn upload_request(
        parts: &[(&str, Option<&str>, &str)],
        auth: Option<(&'static str, String)>,
    ) -> actix_http::Request {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let mut req = test::TestRequest::post()
            .uri("/api/geofiles/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ));
        if let Some(auth) = auth {
            req = req.insert_header(auth);
        }
        req.set_payload(body).to_request()
    }

    #[actix_web::test]
    async fn test_upload_stores_file() {
        let app = init_service(create_test_app()).await;
        let (auth, session) = bearer();

        let content = "{\"type\":\"FeatureCollection\",\"features\":[]}";
        let req = upload_request(
            &[
                ("filename", None, "Harbor Zones"),
                ("description", None, "Port patrol sectors"),
                ("tags", None, "harbor, port"),
                ("accessLevel", None, "department"),
                ("isPublic", None, "true"),
                ("file", Some("zones.geojson"), content),
            ],
            Some(auth),
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Geofile uploaded successfully");

        let geofile = &body["geofile"];
        assert_eq!(geofile["filename"], "Harbor Zones.geojson");
        assert_eq!(geofile["fileType"], "GEOJSON");
        assert_eq!(geofile["fileSize"], content.len());
        assert_eq!(geofile["tags"], json!(["harbor", "port"]));
        assert_eq!(geofile["accessLevel"], "department");
        assert_eq!(geofile["isPublic"], true);
        assert_eq!(geofile["uploadedBy"], session.id);
        assert_eq!(geofile["metadata"]["originalName"], "zones.geojson");
        assert!(geofile["filepath"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/geofiles/"));
    }

    #[actix_web::test]
    async fn test_upload_rejections() {
        let app = init_service(create_test_app()).await;

        let req = upload_request(&[("file", Some("zones.kml"), "<kml/>")], None);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Name/Label is required");

        let req = upload_request(&[("filename", None, "zones")], None);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = upload_request(
            &[("filename", None, "zones"), ("file", Some("zones.zip"), "PK")],
            None,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_upload_size_limits() {
        let app = init_service(create_test_app()).await;

        let oversize = "x".repeat(MAX_GEOFILE_SIZE + 1);
        let req = upload_request(
            &[("filename", None, "zones"), ("file", Some("zones.csv"), &oversize)],
            None,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "File too large. Maximum size is 50 MB");

        let description = "x".repeat(MAX_FIELD_SIZE + 1);
        let req = upload_request(
            &[
                ("filename", None, "zones"),
                ("description", None, &description),
                ("file", Some("zones.kml"), "<kml/>"),
            ],
            None,
        );
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
