use super::*;
use crate::{config::Settings, flash_cookie::FLASH_COOKIE};
use admin_crud::view::extract_context;
use admin_crud::{DeleteTokenManager, FlashBag, RouteTable};
use axum::{
    body::{self, Body},
    extract::Path,
    http::{header, Request},
};
use shared::domain::UserId;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

async fn test_app() -> (Router, Arc<AppState>) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let settings = Settings {
        csrf_secret: "test-secret".into(),
        ..Settings::default()
    };
    let state = Arc::new(AppState::new(storage, &settings));
    (build_router(state.clone()), state)
}

async fn seed_user(state: &AppState, username: &str) -> UserId {
    state
        .storage
        .create_user(username, &format!("{username}@example.test"))
        .await
        .expect("user")
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn context_of(response: Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    extract_context(std::str::from_utf8(&bytes).expect("utf8")).expect("view context")
}

fn flash_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{FLASH_COOKIE}=")))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _state) = test_app().await;
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn index_lists_users_page_by_page() {
    let (app, state) = test_app().await;
    for n in 0..55 {
        seed_user(&state, &format!("user{n:02}")).await;
    }

    let response = app
        .oneshot(
            Request::get("/admin/authentication/users?page=2")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let context = context_of(response).await;
    assert_eq!(context["data"]["total"], 55);
    assert_eq!(context["data"]["items"].as_array().map(Vec::len), Some(5));
    assert_eq!(context["data"]["items"][0]["username"], "user50");
}

#[tokio::test]
async fn create_redirects_to_index_and_carries_flash() {
    let (app, state) = test_app().await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/admin/authentication/users/new",
            "username=alice&email=alice%40example.test",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/authentication/users"));
    let cookie = flash_cookie(&response).expect("flash cookie");
    assert!(state
        .storage
        .find_user_by_username("alice")
        .await
        .expect("query")
        .is_some());

    let follow_up = app
        .oneshot(
            Request::get("/admin/authentication/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let cleared = flash_cookie(&follow_up).expect("cleared cookie");
    assert_eq!(cleared, format!("{FLASH_COOKIE}="));
    let context = context_of(follow_up).await;
    assert_eq!(context["_flashes"][0]["level"], "success");
    assert_eq!(
        context["_flashes"][0]["message"],
        "The creation was completed successfully."
    );
}

#[tokio::test]
async fn duplicate_create_is_unprocessable_unless_framed() {
    let (app, state) = test_app().await;
    seed_user(&state, "alice").await;
    let body = "username=alice&email=new%40example.test";

    let response = app
        .clone()
        .oneshot(form_post("/admin/authentication/users/new", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let context = context_of(response).await;
    assert_eq!(
        context["_flashes"][0]["message"],
        "This username is already taken."
    );

    let mut framed = form_post("/admin/authentication/users/new", body);
    framed
        .headers_mut()
        .insert("turbo-frame", "user-form".parse().expect("header"));
    let response = app.oneshot(framed).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let context = context_of(response).await;
    assert_eq!(context["_turbo_frame_target"], "user-form");
    assert_eq!(
        context["form"]["errors"][0]["message"],
        "This username is already taken."
    );
}

#[tokio::test]
async fn invalid_form_is_redisplayed() {
    let (app, _state) = test_app().await;
    let response = app
        .oneshot(form_post(
            "/admin/authentication/users/new",
            "username=&email=nope",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let context = context_of(response).await;
    assert_eq!(context["form"]["errors"].as_array().map(Vec::len), Some(2));
    assert_eq!(context["_index_url"], "/admin/authentication/users");
}

#[tokio::test]
async fn edit_redirects_to_show_of_the_user() {
    let (app, state) = test_app().await;
    let id = seed_user(&state, "bob").await;

    let form = app
        .clone()
        .oneshot(
            Request::get(format!("/admin/authentication/users/{id}/edit"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(form.status(), StatusCode::OK);
    let context = context_of(form).await;
    assert_eq!(context["form"]["values"]["username"], "bob");
    assert_eq!(
        context["_show_url"],
        format!("/admin/authentication/users/{id}")
    );

    let response = app
        .oneshot(form_post(
            &format!("/admin/authentication/users/{id}/edit"),
            "username=robert&email=bob%40example.test",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!("/admin/authentication/users/{id}");
    assert_eq!(location(&response), Some(expected.as_str()));
    let user = state.storage.find_user(id).await.expect("query").expect("user");
    assert_eq!(user.username, "robert");
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let (app, _state) = test_app().await;
    let response = app
        .oneshot(
            Request::get("/admin/authentication/users/999/edit")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_with_bad_token_redirects_without_deleting() {
    let (app, state) = test_app().await;
    let id = seed_user(&state, "carol").await;

    let response = app
        .oneshot(form_post(
            &format!("/admin/authentication/users/{id}/delete"),
            "_token=forged",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/authentication/users"));
    assert!(state.storage.find_user(id).await.expect("query").is_some());
}

#[tokio::test]
async fn xhr_delete_with_header_token_is_accepted() {
    let (app, state) = test_app().await;
    let id = seed_user(&state, "dave").await;
    let token = state.tokens.delete_token(&id.to_string());

    let request = Request::post(format!("/admin/authentication/users/{id}/delete"))
        .header("x-requested-with", "XMLHttpRequest")
        .header("x-csrf-token", token)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert!(bytes.is_empty());
    assert!(state.storage.find_user(id).await.expect("query").is_none());
}

#[tokio::test]
async fn show_exposes_delete_token_for_the_row() {
    let (app, state) = test_app().await;
    let id = seed_user(&state, "erin").await;

    let response = app
        .oneshot(
            Request::get(format!("/admin/authentication/users/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let context = context_of(response).await;
    assert_eq!(context["data"]["username"], "erin");
    assert_eq!(
        context["_delete_token"],
        state.tokens.delete_token(&id.to_string())
    );
}

#[tokio::test]
async fn unban_of_active_user_flashes_error_and_returns_to_show() {
    let (app, state) = test_app().await;
    let id = seed_user(&state, "frank").await;

    let response = app
        .oneshot(
            Request::post(format!("/admin/authentication/users/{id}/unban"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!("/admin/authentication/users/{id}");
    assert_eq!(location(&response), Some(expected.as_str()));

    let cookie = flash_cookie(&response).expect("flash cookie");
    let raw = cookie.trim_start_matches(&format!("{FLASH_COOKIE}=")).to_string();
    let payload = state.tokens.verify(&raw).expect("signed flash cookie");
    let flashes = FlashBag::decode(payload).take();
    assert_eq!(flashes[0].level, admin_crud::FlashLevel::Error);
    assert_eq!(flashes[0].message, "This user is not banned.");
}

#[tokio::test]
async fn unsigned_or_foreign_flash_cookie_is_ignored_and_cleared() {
    let (app, _) = test_app().await;
    let mut planted = FlashBag::new();
    planted.success("Your account was upgraded.");
    let encoded = planted.encode();

    for cookie in [
        encoded.clone(),
        DeleteTokenManager::new("another-secret").sign(&encoded),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::get("/admin/authentication/users")
                    .header(header::COOKIE, format!("{FLASH_COOKIE}={cookie}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = flash_cookie(&response).expect("cleared cookie");
        assert_eq!(cleared, format!("{FLASH_COOKIE}="));
        let context = context_of(response).await;
        assert_eq!(context["_flashes"].as_array().map(Vec::len), Some(0));
    }
}

#[tokio::test]
async fn generated_paths_keep_spaces_through_path_extraction() {
    let mut routes = RouteTable::new();
    routes.register("item_show", "/items/:id");
    let uri = routes
        .generate("item_show", &[("id", "a b")])
        .expect("url");

    let app: Router = Router::new().route(
        "/items/:id",
        get(|Path(id): Path<String>| async move { id }),
    );
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&bytes[..], b"a b");
}
