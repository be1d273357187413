#![allow(clippy::unused_async)]
//! PROPFIND over HTTP.

use salvo::http::StatusCode;

use super::helpers::*;

const PROP_DISPLAYNAME: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:prop><D:displayname/><D:getetag/></D:prop>
</D:propfind>"#;

#[test_log::test(tokio::test)]
async fn empty_body_depth_one_lists_members_with_etags() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::propfind(&cal_path("work", None))
        .depth("1")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_header("Content-Type", "application/xml; charset=utf-8")
        .assert_body_contains("/api/dav/cal/alice/work/jan.ics")
        .assert_body_contains("/api/dav/cal/alice/work/feb.ics");

    assert_eq!(response.count_multistatus_responses(), 3);
    assert_eq!(response.body_string().matches("<D:getetag>").count(), 2);
}

#[test_log::test(tokio::test)]
async fn depth_zero_returns_only_the_collection() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("getctag")
        .assert_body_not_contains("jan.ics");

    assert_eq!(response.count_multistatus_responses(), 1);
}

#[test_log::test(tokio::test)]
async fn unknown_properties_are_reported_missing() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .xml_body(PROP_DISPLAYNAME)
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:displayname>Work</D:displayname>")
        .assert_body_contains("HTTP/1.1 404 Not Found");
}

#[test_log::test(tokio::test)]
async fn garbage_body_is_answered_as_allprop() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .xml_body("<not-xml")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:displayname>Work</D:displayname>");
}

#[test_log::test(tokio::test)]
async fn calendar_home_lists_birthday_calendar() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::propfind("/api/dav/cal/alice/")
        .depth("1")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/work/")
        .assert_body_contains("/api/dav/cal/alice/birthdays/");

    assert_eq!(response.count_multistatus_responses(), 3);
}

#[test_log::test(tokio::test)]
async fn principal_advertises_home_sets() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind("/api/dav/principal/alice/")
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/")
        .assert_body_contains("/api/dav/card/alice/")
        .assert_body_contains("Alice Example");
}

#[test_log::test(tokio::test)]
async fn calendar_collections_advertise_protocol_limits() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::propfind(&cal_path("work", None))
        .depth("0")
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("10485760")
        .assert_body_contains("VFREEBUSY");
}
