//! GET, HEAD, PUT and DELETE over HTTP.

use salvo::http::StatusCode;

use super::helpers::*;

const STANDUP: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
DTSTAMP:20240101T000000Z\r\n\
DTSTART:20240301T090000Z\r\n\
DTEND:20240301T091500Z\r\n\
SUMMARY:Standup\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

#[test_log::test(tokio::test)]
async fn get_returns_body_and_validators() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let response = TestRequest::get(&cal_path("work", Some("jan.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Type", "text/calendar; charset=utf-8")
        .assert_header_exists("ETag")
        .assert_header_exists("Last-Modified");
    assert_eq!(response.body_string(), JAN_EVENT);

    TestRequest::get(&card_path("friends", Some("jane.vcf")))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Type", "text/vcard; charset=utf-8")
        .assert_body_contains("FN:Jane Doe");
}

#[test_log::test(tokio::test)]
async fn head_matches_get_without_body() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    let get = TestRequest::get(&cal_path("work", Some("jan.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    let head = TestRequest::head(&cal_path("work", Some("jan.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_empty();

    assert_eq!(get.get_header("ETag"), head.get_header("ETag"));
}

#[test_log::test(tokio::test)]
async fn put_creates_then_replaces() {
    let env = TestEnv::seeded().await;
    let service = env.service();
    let path = cal_path("work", Some("standup.ics"));

    let created = TestRequest::put(&path)
        .icalendar_body(STANDUP)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .assert_header_exists("ETag");

    let replaced = TestRequest::put(&path)
        .icalendar_body(&STANDUP.replace("Standup", "Daily standup"))
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_ne!(created.get_header("ETag"), replaced.get_header("ETag"));

    TestRequest::get(&path)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("SUMMARY:Daily standup");
}

#[test_log::test(tokio::test)]
async fn put_rejects_unparsable_content() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::put(&cal_path("work", Some("broken.ics")))
        .icalendar_body("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn birthday_calendar_is_read_only() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    TestRequest::put(&cal_path("birthdays", Some("mine.ics")))
        .icalendar_body(STANDUP)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_body_contains("need-privileges");

    TestRequest::get(&cal_path("birthdays", Some("friends-jane.ics")))
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("RRULE:FREQ=YEARLY");
}

#[test_log::test(tokio::test)]
async fn delete_then_get_is_not_found() {
    let env = TestEnv::seeded().await;
    let service = env.service();
    let path = card_path("friends", Some("bob.vcf"));

    TestRequest::delete(&path)
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    TestRequest::get(&path)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    TestRequest::delete(&path)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
