//! REPORT over HTTP.

use salvo::http::StatusCode;

use super::helpers::*;

const JANUARY_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop><D:getetag/><C:calendar-data/></D:prop>
  <C:filter>
    <C:comp-filter name="VCALENDAR">
      <C:comp-filter name="VEVENT">
        <C:time-range start="20240101T000000Z" end="20240102T000000Z"/>
      </C:comp-filter>
    </C:comp-filter>
  </C:filter>
</C:calendar-query>"#;

const MULTIGET: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<C:calendar-multiget xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop><D:getetag/></D:prop>
  <D:href>/api/dav/cal/alice/work/feb.ics</D:href>
  <D:href>/api/dav/cal/alice/work/missing.ics</D:href>
</C:calendar-multiget>"#;

const FREE_BUSY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<C:free-busy-query xmlns:C="urn:ietf:params:xml:ns:caldav">
  <C:time-range start="20240101T000000Z" end="20240102T000000Z"/>
</C:free-busy-query>"#;

const JANE_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CR:addressbook-query xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav">
  <D:prop><D:getetag/><CR:address-data/></D:prop>
  <CR:filter>
    <CR:prop-filter name="FN">
      <CR:text-match collation="i;unicode-casemap" match-type="contains">jane</CR:text-match>
    </CR:prop-filter>
  </CR:filter>
</CR:addressbook-query>"#;

#[test_log::test(tokio::test)]
async fn calendar_query_matches_by_time_range() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::report(&cal_path("work", None))
        .xml_body(JANUARY_QUERY)
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/work/jan.ics")
        .assert_body_contains("New year standup")
        .assert_body_not_contains("feb.ics");

    assert_eq!(response.count_multistatus_responses(), 1);
}

#[test_log::test(tokio::test)]
async fn multiget_reports_missing_hrefs() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::report(&cal_path("work", None))
        .xml_body(MULTIGET)
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/work/feb.ics")
        .assert_body_contains("/api/dav/cal/alice/work/missing.ics")
        .assert_body_contains("HTTP/1.1 404 Not Found");

    assert_eq!(response.count_multistatus_responses(), 2);
}

#[test_log::test(tokio::test)]
async fn free_busy_query_returns_calendar_text() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::report(&cal_path("work", None))
        .xml_body(FREE_BUSY)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Type", "text/calendar; charset=utf-8")
        .assert_body_contains("BEGIN:VFREEBUSY")
        .assert_body_contains("FREEBUSY:20240101T090000Z/20240101T100000Z");
}

#[test_log::test(tokio::test)]
async fn addressbook_query_matches_text() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::report(&card_path("friends", None))
        .xml_body(JANE_QUERY)
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/card/alice/friends/jane.vcf")
        .assert_body_not_contains("bob.vcf");

    assert_eq!(response.count_multistatus_responses(), 1);
}

#[test_log::test(tokio::test)]
async fn report_on_a_resource_is_forbidden() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    for body in [JANUARY_QUERY, MULTIGET, FREE_BUSY] {
        TestRequest::report(&cal_path("work", Some("jan.ics")))
            .xml_body(body)
            .send(&service)
            .await
            .assert_status(StatusCode::FORBIDDEN)
            .assert_body_contains("supported-report");
    }
}

#[test_log::test(tokio::test)]
async fn calendar_report_on_addressbook_is_forbidden() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::report(&card_path("friends", None))
        .xml_body(JANUARY_QUERY)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn birthday_calendar_answers_queries() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::report(&cal_path("birthdays", None))
        .xml_body(
            r#"<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop><C:calendar-data/></D:prop>
  <C:filter><C:comp-filter name="VCALENDAR"/></C:filter>
</C:calendar-query>"#,
        )
        .send(&service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/api/dav/cal/alice/birthdays/friends-jane.ics")
        .assert_body_contains("RRULE:FREQ=YEARLY")
        .assert_body_not_contains("bob");
}

#[test_log::test(tokio::test)]
async fn malformed_report_body_is_rejected() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::report(&cal_path("work", None))
        .xml_body("<C:calendar-query")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
