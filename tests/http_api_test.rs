/// HTTP-level tests: routing, bearer extraction and JSON error bodies
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;

#[actix_rt::test]
async fn test_index_is_plain_text() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("running"));
}

#[actix_rt::test]
async fn test_bearer_extraction_errors() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let viewer = create_viewer(&db, "viewer").await.unwrap();
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let movie = json!({ "title": "Arrival", "release_year": 2016 });

    let cases = [
        (None, StatusCode::UNAUTHORIZED, "No token provided"),
        (Some("Token abc".to_string()), StatusCode::UNAUTHORIZED, "Invalid token format"),
        (Some("Bearer not.a.jwt".to_string()), StatusCode::FORBIDDEN, "Token is not valid"),
        (Some(bearer(&test_keys(), &viewer)), StatusCode::FORBIDDEN, "Admin only"),
    ];

    for (authorization, status, message) in cases {
        let mut req = test::TestRequest::post().uri("/api/movies").set_json(&movie);
        if let Some(value) = authorization {
            req = req.insert_header((header::AUTHORIZATION, value));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), status, "{}", message);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }
}

#[actix_rt::test]
async fn test_admin_movie_lifecycle() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let admin = create_admin(&db).await.unwrap();
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = bearer(&test_keys(), &admin);

    let req = test::TestRequest::post()
        .uri("/api/admin/movies")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "title": "Arrival", "release_year": 2016 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("m_"));

    // Formatted and bare ids address the same row.
    let bare = id.trim_start_matches("m_").to_string();
    for path in [format!("/api/movies/{}", id), format!("/api/movies/{}", bare)] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(&path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/movies/{}", id))
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "title": "Arrival", "release_year": 1700 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/movies/{}", id))
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["deleted"]["id"], id.as_str());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/api/movies/{}", id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Movie not found");
}

#[actix_rt::test]
async fn test_extractor_failures_are_json_400() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/movies/x_12").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid content ID format");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/likes").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_trending_over_http() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let admin = create_admin(&db).await.unwrap();
    let show = create_series(&db, "Frieren", true).await.unwrap();
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = bearer(&test_keys(), &admin);

    let req = test::TestRequest::post()
        .uri("/api/trending")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({
            "content_id": format!("s_{}", show.id),
            "content_type": "series",
            "trending_type": "anime",
            "position": 2,
            "video_url": "https://res.cloudinary.com/demo/video/upload/v1/frieren.mp4",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["content_id"], format!("s_{}", show.id));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trending/positions?trending_type=anime")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["available_positions"], json!([1, 3, 4, 5, 6, 7, 8, 9, 10]));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trending?trending_type=anime")
            .to_request(),
    )
    .await;
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/trending/{}", created["id"]))
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["asset_deleted"], true);
}

#[actix_rt::test]
async fn test_subscription_none_then_active() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let viewer = create_viewer(&db, "viewer").await.unwrap();
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = bearer(&test_keys(), &viewer);

    let req = test::TestRequest::get()
        .uri("/api/subscriptions")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "none");

    let req = test::TestRequest::post()
        .uri("/api/subscriptions")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "plan": "premium", "payment_method": "card" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/subscriptions")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "active");
    assert_eq!(body["plan"], "premium");
}

#[actix_rt::test]
async fn test_google_sign_in_over_http() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/google")
        .set_json(json!({ "id_token": "valid-google-token" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "googler@test.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(test_keys().verify(body["token"].as_str().unwrap()).is_ok());

    let req = test::TestRequest::post()
        .uri("/api/auth/google")
        .set_json(json!({ "id_token": "forged" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_image_delete_failure_is_500() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let admin = create_admin(&db).await.unwrap();
    let state = TestState::new(db).with_store(Arc::new(FailingStore));
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::delete()
        .uri("/api/cloudinary/delete-image")
        .insert_header((header::AUTHORIZATION, bearer(&test_keys(), &admin)))
        .set_json(json!({
            "image_url": "https://res.cloudinary.com/demo/image/upload/v1/poster.jpg"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to delete image from storage"));
}

#[actix_rt::test]
async fn test_image_delete_accepts_numeric_content_id() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let admin = create_admin(&db).await.unwrap();
    let state = TestState::new(db);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = bearer(&test_keys(), &admin);
    let poster = "https://res.cloudinary.com/demo/image/upload/v1/posters/heat.jpg";

    let req = test::TestRequest::post()
        .uri("/api/movies")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "title": "Heat", "poster_url": poster }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let bare: i64 = created["id"]
        .as_str()
        .unwrap()
        .trim_start_matches("m_")
        .parse()
        .unwrap();

    let req = test::TestRequest::delete()
        .uri("/api/cloudinary/delete-image")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({
            "image_url": poster,
            "content_type": "movies",
            "content_id": bare,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["database_update"]["table"], "movies");
    assert_eq!(body["database_update"]["record"]["id"], created["id"]);
    assert_eq!(body["database_update"]["record"]["poster_url"], "");
}

#[actix_rt::test]
async fn test_cors_allows_only_configured_origins() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let state = TestState::new(db);
    let mut config = nikoflix::app_config::AppConfig::default();
    config.site.frontend_url = "http://frontend.test".to_string();
    let app = test::init_service(
        App::new()
            .wrap(nikoflix::middleware::build_cors(&config))
            .configure(|cfg| state.configure(cfg)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/movies")
        .insert_header((header::ORIGIN, "http://frontend.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://frontend.test"
    );
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/movies")
        .insert_header((header::ORIGIN, "http://frontend.test"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));

    // Other origins are served without the allow header.
    let req = test::TestRequest::get()
        .uri("/api/movies")
        .insert_header((header::ORIGIN, "http://elsewhere.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(!resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
