//! OPTIONS over HTTP.

use salvo::http::StatusCode;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn options_advertises_methods_and_classes() {
    let env = TestEnv::seeded().await;
    let service = env.service();

    for path in [
        cal_path("work", None),
        cal_path("work", Some("jan.ics")),
        card_path("friends", None),
    ] {
        TestRequest::options(&path)
            .send(&service)
            .await
            .assert_status(StatusCode::OK)
            .assert_header("Allow", "OPTIONS, GET, HEAD, PUT, DELETE, PROPFIND, REPORT")
            .assert_header("DAV", "1, 3, calendar-access, addressbook");
    }
}

#[test_log::test(tokio::test)]
async fn options_needs_no_authentication() {
    let mut settings = kunai_test::core::config::Settings::for_single_user(USER);
    settings.auth.method = kunai_test::core::config::AuthMethod::Proxy;
    settings.auth.proxy = Some(kunai_test::core::config::ProxyAuthConfig {
        header: "X-Remote-User".to_string(),
    });
    let env = TestEnv::with_settings(settings).await;

    TestRequest::options(&cal_path("work", None))
        .send(&env.service())
        .await
        .assert_status(StatusCode::OK);
}
