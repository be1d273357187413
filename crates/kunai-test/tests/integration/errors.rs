//! Error mapping over HTTP: 400, 401, 403, 404, 409, 413.

use salvo::http::StatusCode;

use super::helpers::*;
use kunai_test::core::config::{AuthMethod, ProxyAuthConfig, Settings};
use kunai_test::core::types::CollectionKind;
use kunai_test::store::{DavStore, NewCollection};

fn proxy_settings() -> Settings {
    let mut settings = Settings::for_single_user(USER);
    settings.auth.method = AuthMethod::Proxy;
    settings.auth.proxy = Some(ProxyAuthConfig {
        header: "X-Remote-User".to_string(),
    });
    settings
}

#[test_log::test(tokio::test)]
async fn missing_collection_is_not_found() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind(&cal_path("nope", None))
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    TestRequest::get(&cal_path("work", Some("nope.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn duplicate_slug_is_a_conflict() {
    let env = TestEnv::seeded().await;
    env.store
        .create_collection(NewCollection::new(USER, "work", CollectionKind::Calendar))
        .await
        .expect("duplicate calendar");
    let service = env.service();

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn other_users_paths_are_forbidden() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind("/api/dav/cal/mallory/work/")
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn invalid_identifiers_are_bad_requests() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::get("/api/dav/cal/alice/work/bad%20name.ics")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    TestRequest::propfind("/api/dav/cal/alice/work/jan.ics")
        .depth("2")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn oversized_bodies_are_rejected() {
    let mut settings = Settings::for_single_user(USER);
    settings.server.max_body_bytes = 64;
    let env = TestEnv::with_settings(settings).await;
    let service = env.service();

    let body = JAN_EVENT.to_string();
    TestRequest::put(&cal_path("work", Some("big.ics")))
        .header("Content-Length", &body.len().to_string())
        .icalendar_body(&body)
        .send(&service)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    TestRequest::get(&cal_path("work", Some("big.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn proxy_auth_requires_the_header() {
    let env = TestEnv::with_settings(proxy_settings()).await;
    let service = env.service();

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .header("X-Remote-User", USER)
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .header("X-Remote-User", "mallory")
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
