mod common;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, test, web};
use blog_server::infrastructure::config::AppConfig;
use blog_server::server::build_app;
use common::{ADMIN_SECRET, MEMBER_SECRET, post_doc, seed, setup};
use serde_json::{Value, json};

macro_rules! app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(
            build_app(&AppConfig::in_memory(), &state)
                .route(
                    "/dashboard",
                    web::get().to(|| async { HttpResponse::Ok().body("dashboard") }),
                )
                .route(
                    "/sign-in",
                    web::get().to(|| async { HttpResponse::Ok().body("sign in") }),
                ),
        )
        .await
    }};
}

fn session(secret: &str) -> Cookie<'static> {
    Cookie::new("blog-session", secret.to_string())
}

fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[actix_web::test]
async fn dashboard_redirects_anonymous_visitors_to_sign_in() {
    let (_, state) = setup().await;
    let app = app!(state);

    for uri in ["/dashboard", "/dashboard/posts/new"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/sign-in"));
    }

    let stale = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(session("expired"))
        .to_request();
    let resp = test::call_service(&app, stale).await;
    assert_eq!(location(&resp).as_deref(), Some("/sign-in"));
}

#[actix_web::test]
async fn dashboard_sends_members_home_and_lets_admins_in() {
    let (_, state) = setup().await;
    let app = app!(state);

    let member = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(session(MEMBER_SECRET))
        .to_request();
    let resp = test::call_service(&app, member).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));

    let admin = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(session(ADMIN_SECRET))
        .to_request();
    let resp = test::call_service(&app, admin).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn signed_in_users_are_sent_from_sign_in_to_dashboard() {
    let (_, state) = setup().await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/sign-in")
        .insert_header((header::AUTHORIZATION, format!("Bearer {MEMBER_SECRET}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

    let anonymous = test::TestRequest::get().uri("/sign-in").to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn mutating_calls_from_non_admins_are_forbidden() {
    let (_, state) = setup().await;
    let app = app!(state);
    let body = json!({ "title": "Hello", "content": "<p>hi</p>" });

    let member = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(session(MEMBER_SECRET))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, member).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let error: Value = test::read_body_json(resp).await;
    assert!(error["error"].as_str().unwrap().contains("forbidden"));

    let anonymous = test::TestRequest::delete()
        .uri("/api/category?id=rust")
        .to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let list = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
    let page: Value = test::read_body_json(list).await;
    assert_eq!(page["total"], 0);
}

#[actix_web::test]
async fn admins_manage_posts_end_to_end() {
    let (_, state) = setup().await;
    let app = app!(state);

    let create = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(session(ADMIN_SECRET))
        .set_json(json!({
            "title": "React & Next.js!",
            "content": "<p>hello</p>",
            "status": "published",
            "keywords": "react, next.js"
        }))
        .to_request();
    let resp = test::call_service(&app, create).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["slug"], "react-and-nextjs");
    let id = created["id"].as_str().unwrap().to_string();

    let update = test::TestRequest::put()
        .uri("/api/posts")
        .cookie(session(ADMIN_SECRET))
        .set_json(json!({ "id": id, "title": "Renamed" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, update).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["slug"], "react-and-nextjs");

    let by_slug = test::TestRequest::get()
        .uri("/api/posts?slug=react-and-nextjs&related=3")
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, by_slug).await;
    assert_eq!(detail["id"], id.as_str());
    assert_eq!(detail["related"], json!([]));

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/posts?id={id}"))
        .cookie(session(ADMIN_SECRET))
        .to_request();
    let resp = test::call_service(&app, delete).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let gone = test::TestRequest::get()
        .uri(&format!("/api/posts?id={id}"))
        .to_request();
    let resp = test::call_service(&app, gone).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: Value = test::read_body_json(resp).await;
    assert!(error["error"].is_string());
}

#[actix_web::test]
async fn validation_errors_name_the_field() {
    let (_, state) = setup().await;
    let app = app!(state);

    let missing_title = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(session(ADMIN_SECRET))
        .set_json(json!({ "content": "<p>x</p>" }))
        .to_request();
    let resp = test::call_service(&app, missing_title).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "title is required");

    let missing_id = test::TestRequest::put()
        .uri("/api/posts")
        .cookie(session(ADMIN_SECRET))
        .set_json(json!({ "title": "x" }))
        .to_request();
    let resp = test::call_service(&app, missing_id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let blank_search = test::TestRequest::get()
        .uri("/api/posts/search?q=")
        .to_request();
    let resp = test::call_service(&app, blank_search).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "q is required");
}

#[actix_web::test]
async fn drafts_stay_private_to_admins() {
    let (store, state) = setup().await;
    let mut draft = post_doc("d1", "Work In Progress", 1);
    draft["status"] = json!("draft");
    seed(&store, [draft, post_doc("p1", "Live", 2)]).await;
    let app = app!(state);

    let public = test::TestRequest::get().uri("/api/posts?id=d1").to_request();
    let resp = test::call_service(&app, public).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let admin_all = test::TestRequest::get()
        .uri("/api/posts?status=all")
        .cookie(session(ADMIN_SECRET))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, admin_all).await;
    assert_eq!(page["total"], 2);

    let member_all = test::TestRequest::get()
        .uri("/api/posts?status=all")
        .cookie(session(MEMBER_SECRET))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, member_all).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["totalPages"], 1);
}

#[actix_web::test]
async fn tags_endpoint_lists_and_filters() {
    let (store, state) = setup().await;
    let mut a = post_doc("a", "A", 1);
    a["keywords"] = json!("Next.js, rust");
    let mut b = post_doc("b", "B", 2);
    b["keywords"] = json!("next js");
    seed(&store, [a, b]).await;
    let app = app!(state);

    let all: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/posts/tags").to_request(),
    )
    .await;
    assert_eq!(all["tags"].as_array().unwrap().len(), 2);

    let filtered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/posts/tags?tag=nextjs&page=1&limit=1")
            .to_request(),
    )
    .await;
    assert_eq!(filtered["total"], 2);
    assert_eq!(filtered["totalPages"], 2);
    assert_eq!(filtered["posts"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn uploads_accept_images_only() {
    let (_, state) = setup().await;
    let app = app!(state);

    let text = test::TestRequest::post()
        .uri("/api/upload?filename=notes.txt")
        .cookie(session(ADMIN_SECRET))
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, text).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let image = test::TestRequest::post()
        .uri("/api/upload?filename=banner.png")
        .cookie(session(ADMIN_SECRET))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let resp = test::call_service(&app, image).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let file: Value = test::read_body_json(resp).await;
    assert_eq!(file["name"], "banner.png");
    assert_eq!(file["size"], 4);

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/upload").to_request(),
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn unconfigured_integrations_fail_without_leaking_detail() {
    let (_, state) = setup().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/youtube").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "internal server error");

    let unknown = test::TestRequest::post()
        .uri("/api/ai/poem")
        .cookie(session(ADMIN_SECRET))
        .set_json(json!({ "content": "text" }))
        .to_request();
    let resp = test::call_service(&app, unknown).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn responses_carry_request_ids() {
    let (_, state) = setup().await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("x-request-id", "abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");

    let missing = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn responses_carry_security_and_timing_headers() {
    let (_, state) = setup().await;
    let app = app!(state);

    for uri in ["/api/health", "/nowhere"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let headers = resp.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
        assert!(headers.contains_key("server-timing"), "{uri} has no server-timing");
    }
}
