//! sync-collection over HTTP.

use salvo::http::StatusCode;

use super::helpers::*;

fn sync_body(token: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:sync-collection xmlns:D="DAV:">
  <D:sync-token>{token}</D:sync-token>
  <D:sync-level>1</D:sync-level>
  <D:prop><D:getetag/></D:prop>
</D:sync-collection>"#
    )
}

#[test_log::test(tokio::test)]
async fn initial_sync_then_no_changes() {
    let env = TestEnv::seeded().await;
    env.put(env.calendar_id, "gone.ics", JAN_EVENT).await;
    env.delete(env.calendar_id, "gone.ics").await;
    let service = env.service();

    let initial = TestRequest::report(&cal_path("work", None))
        .xml_body(&sync_body(""))
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("jan.ics")
        .assert_body_contains("feb.ics")
        .assert_body_not_contains("gone.ics")
        .assert_body_not_contains("HTTP/1.1 404");
    assert_eq!(initial.count_multistatus_responses(), 2);

    let token = initial.element_text("sync-token").expect("sync token");
    let again = TestRequest::report(&cal_path("work", None))
        .xml_body(&sync_body(&token))
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
    assert_eq!(again.count_multistatus_responses(), 0);
    assert!(again.element_text("sync-token").is_some());
}

#[test_log::test(tokio::test)]
async fn deletions_after_the_token_are_reported() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let initial = TestRequest::report(&cal_path("work", None))
        .xml_body(&sync_body(""))
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
    let token = initial.element_text("sync-token").expect("sync token");

    TestRequest::delete(&cal_path("work", Some("feb.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let delta = TestRequest::report(&cal_path("work", None))
        .xml_body(&sync_body(&token))
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/work/feb.ics")
        .assert_body_contains("HTTP/1.1 404 Not Found")
        .assert_body_not_contains("jan.ics");
    assert_eq!(delta.count_multistatus_responses(), 1);
}

#[test_log::test(tokio::test)]
async fn foreign_tokens_are_rejected() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let calendar_token = TestRequest::report(&cal_path("work", None))
        .xml_body(&sync_body(""))
        .send(&service)
        .await
        .element_text("sync-token")
        .expect("sync token");

    for token in [calendar_token.as_str(), "urn:kunai:sync:garbage", "not-a-token"] {
        TestRequest::report(&card_path("friends", None))
            .xml_body(&sync_body(token))
            .send(&service)
            .await
            .assert_status(StatusCode::FORBIDDEN)
            .assert_header("Content-Type", "application/xml; charset=utf-8")
            .assert_body_contains("valid-sync-token");
    }
}
