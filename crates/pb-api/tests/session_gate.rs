//! The session middleware and authorization gate: decode failures resolve
//! to the anonymous path, and protected routes answer anonymous callers
//! identically.

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::Duration;
use pb_api::handlers::AppState;
use pb_api::middleware::{SessionDecoder, SESSION_COOKIE};
use pb_auth_jwt::JwtAuthProvider;
use pb_core::models::Identity;
use pb_core::traits::{AuthProvider, UserRepo};
use pb_db_sqlite::SqliteStore;

const SECRET: &str = "gate-secret";

async fn store_and_state() -> (SqliteStore, web::Data<AppState>) {
    let store = SqliteStore::in_memory().await.unwrap();
    let state = web::Data::new(AppState {
        users: Box::new(store.clone()),
        domain: Box::new(store.clone()),
        auth: Box::new(JwtAuthProvider::new(SECRET)),
    });
    (store, state)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(SessionDecoder)
                .configure(pb_api::configure_routes),
        )
        .await
    };
}

fn assert_entry_redirect<B>(resp: &actix_web::dev::ServiceResponse<B>) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[actix_web::test]
async fn protected_routes_redirect_anonymous_callers_identically() {
    let (_store, state) = store_and_state().await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/homepage").to_request(),
    )
    .await;
    assert_entry_redirect(&resp);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/create-post").to_request(),
    )
    .await;
    assert_entry_redirect(&resp);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create-post")
            .set_form([("title", "Hi"), ("body", "hello")])
            .to_request(),
    )
    .await;
    assert_entry_redirect(&resp);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/reserve")
            .set_form([("park", "LotA,12,3,5")])
            .to_request(),
    )
    .await;
    assert_entry_redirect(&resp);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/view-history").to_request(),
    )
    .await;
    assert_entry_redirect(&resp);
}

#[actix_web::test]
async fn forged_token_resolves_to_anonymous() {
    let (_store, state) = store_and_state().await;
    let app = test_app!(state);

    let forged = JwtAuthProvider::new("some-other-secret")
        .issue_session(&Identity {
            user_id: 1,
            username: "mallory".to_string(),
        })
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/homepage")
            .cookie(Cookie::new(SESSION_COOKIE, forged.clone()))
            .to_request(),
    )
    .await;
    assert_entry_redirect(&resp);

    // The entry page treats the caller as logged out, not as an error.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, forged))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn expired_token_resolves_to_anonymous() {
    let (_store, state) = store_and_state().await;
    let app = test_app!(state);

    // Right secret, expiry in the past.
    let expired = JwtAuthProvider::with_ttl(SECRET, Duration::hours(-1))
        .issue_session(&Identity {
            user_id: 1,
            username: "alice".to_string(),
        })
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/homepage")
            .cookie(Cookie::new(SESSION_COOKIE, expired))
            .to_request(),
    )
    .await;
    assert_entry_redirect(&resp);
}

#[actix_web::test]
async fn garbage_cookie_renders_the_entry_view() {
    let (_store, state) = store_and_state().await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, "definitely-not-a-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("Log in"));
}

#[actix_web::test]
async fn valid_token_passes_the_gate() {
    let (store, state) = store_and_state().await;
    let app = test_app!(state);

    let carol = store.create_user("carol", "digest").await.unwrap();
    let token = JwtAuthProvider::new(SECRET)
        .issue_session(&Identity {
            user_id: carol.id,
            username: carol.username.clone(),
        })
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/homepage")
            .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // An authenticated caller on the entry page goes straight home.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/homepage");
}

#[actix_web::test]
async fn anonymous_park_view_shows_empty_history() {
    let (_store, state) = store_and_state().await;
    let app = test_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/park").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body)
        .unwrap()
        .contains("No reservations yet."));
}

#[actix_web::test]
async fn logout_clears_the_session_cookie() {
    let (store, state) = store_and_state().await;
    let app = test_app!(state);

    let carol = store.create_user("carol", "digest").await.unwrap();
    let token = JwtAuthProvider::new(SECRET)
        .issue_session(&Identity {
            user_id: carol.id,
            username: carol.username.clone(),
        })
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request(),
    )
    .await;
    assert_entry_redirect(&resp);
    let cleared = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("removal cookie is set");
    assert!(cleared.value().is_empty());
}
