#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Seeding an in-memory store with calendars, address books and items
//! - Creating a test Salvo service over it
//! - Making HTTP requests
//! - Asserting on responses

use std::sync::Arc;

use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};

use kunai_test::app::app::api::routes;
use kunai_test::app::config::ConfigHandler;
use kunai_test::app::store_handler::StoreHandler;
use kunai_test::core::config::Settings;
use kunai_test::core::types::CollectionKind;
use kunai_test::store::{DavStore, MemoryStore, NewCollection, Principal};

pub const USER: &str = "alice";

pub const JAN_EVENT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:jan@example.com\r\n\
DTSTAMP:20231201T000000Z\r\n\
DTSTART:20240101T090000Z\r\n\
DTEND:20240101T100000Z\r\n\
SUMMARY:New year standup\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

pub const FEB_EVENT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:feb@example.com\r\n\
DTSTAMP:20231201T000000Z\r\n\
DTSTART:20240201T090000Z\r\n\
DTEND:20240201T100000Z\r\n\
SUMMARY:February review\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

pub const JANE_CARD: &str = "BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:jane@example.com\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.com\r\n\
BDAY:19900315\r\n\
END:VCARD\r\n";

pub const BOB_CARD: &str = "BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:bob@example.com\r\n\
FN:Bob Smith\r\n\
EMAIL:bob@example.org\r\n\
END:VCARD\r\n";

/// Store and settings behind one test service.
pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub settings: Settings,
    pub calendar_id: u64,
    pub addressbook_id: u64,
}

impl TestEnv {
    /// ## Summary
    /// Seeds `alice` with calendar `work` (`jan.ics`, `feb.ics`) and address
    /// book `friends` (`jane.vcf`, `bob.vcf`).
    ///
    /// ## Panics
    /// Panics if seeding the store fails.
    pub async fn seeded() -> Self {
        Self::with_settings(Settings::for_single_user(USER)).await
    }

    /// ## Panics
    /// Panics if seeding the store fails.
    pub async fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        store
            .add_principal(Principal {
                name: USER.to_string(),
                display_name: "Alice Example".to_string(),
                email: Some("alice@example.com".to_string()),
            })
            .await
            .expect("principal");

        let calendar = store
            .create_collection(
                NewCollection::new(USER, "work", CollectionKind::Calendar)
                    .with_display_name("Work"),
            )
            .await
            .expect("calendar");
        let addressbook = store
            .create_collection(
                NewCollection::new(USER, "friends", CollectionKind::Addressbook)
                    .with_display_name("Friends"),
            )
            .await
            .expect("address book");

        let env = Self {
            store,
            settings,
            calendar_id: calendar.id,
            addressbook_id: addressbook.id,
        };
        env.put(env.calendar_id, "jan.ics", JAN_EVENT).await;
        env.put(env.calendar_id, "feb.ics", FEB_EVENT).await;
        env.put(env.addressbook_id, "jane.vcf", JANE_CARD).await;
        env.put(env.addressbook_id, "bob.vcf", BOB_CARD).await;
        env
    }

    /// ## Panics
    /// Panics if the write fails.
    pub async fn put(&self, collection_id: u64, name: &str, body: &str) {
        self.store
            .put_resource(collection_id, name, body.to_string())
            .await
            .expect("seed resource");
    }

    /// ## Panics
    /// Panics if the delete fails.
    pub async fn delete(&self, collection_id: u64, name: &str) {
        self.store
            .delete_resource(collection_id, name)
            .await
            .expect("delete resource");
    }

    /// Creates a Salvo service with the same hoops as the binary.
    #[must_use]
    pub fn service(&self) -> Service {
        let store: Arc<dyn DavStore> = self.store.clone();
        let router = Router::new()
            .hoop(StoreHandler { store })
            .hoop(ConfigHandler {
                settings: Arc::new(self.settings.clone()),
            })
            .push(routes());
        Service::new(router)
    }
}

#[must_use]
pub fn cal_path(collection: &str, item: Option<&str>) -> String {
    match item {
        Some(item) => format!("/api/dav/cal/{USER}/{collection}/{item}"),
        None => format!("/api/dav/cal/{USER}/{collection}/"),
    }
}

#[must_use]
pub fn card_path(collection: &str, item: Option<&str>) -> String {
    match item {
        Some(item) => format!("/api/dav/card/{USER}/{collection}/{item}"),
        None => format!("/api/dav/card/{USER}/{collection}/"),
    }
}

/// Test request builder for constructing HTTP requests.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequest {
    /// Creates a new test request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn options(path: &str) -> Self {
        Self::new(Method::OPTIONS, path)
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn head(path: &str) -> Self {
        Self::new(Method::HEAD, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn propfind(path: &str) -> Self {
        Self::new(Method::from_bytes(b"PROPFIND").expect("Valid method"), path)
    }

    /// Creates a new REPORT request.
    #[must_use]
    pub fn report(path: &str) -> Self {
        Self::new(Method::from_bytes(b"REPORT").expect("Valid method"), path)
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets the Depth header.
    #[must_use]
    pub fn depth(self, depth: &str) -> Self {
        self.header("Depth", depth)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets an XML request body.
    #[must_use]
    pub fn xml_body(self, xml: &str) -> Self {
        self.header("Content-Type", "application/xml; charset=utf-8")
            .body(xml.as_bytes().to_vec())
    }

    /// Sets an iCalendar request body.
    #[must_use]
    pub fn icalendar_body(self, ical: &str) -> Self {
        self.header("Content-Type", "text/calendar; charset=utf-8")
            .body(ical.as_bytes().to_vec())
    }

    /// Sends the request to the test service and returns the response.
    ///
    /// ## Panics
    /// Panics if the request cannot be sent or the response cannot be read.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "HEAD" => TestClient::head(&url),
            "PUT" => TestClient::put(&url),
            "DELETE" => TestClient::delete(&url),
            "OPTIONS" => TestClient::options(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut response = client.send(service).await;

        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body: Vec<u8> = response.take_bytes(None).await.unwrap_or_default().to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected} but got {}:\n{}",
            self.status,
            self.body_string()
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    #[must_use]
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        let value = self
            .get_header(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found in response"));
        assert_eq!(
            value, expected,
            "Header '{name}' expected '{expected}' but got '{value}'"
        );
        self
    }

    /// Asserts that a header exists (regardless of value).
    #[must_use]
    pub fn assert_header_exists(self, name: &str) -> Self {
        assert!(
            self.get_header(name).is_some(),
            "Header '{name}' not found in response"
        );
        self
    }

    /// Asserts that the response body contains the expected substring.
    #[must_use]
    pub fn assert_body_contains(self, expected: &str) -> Self {
        let body = self.body_string();
        assert!(
            body.contains(expected),
            "Expected body to contain '{expected}' but got:\n{body}"
        );
        self
    }

    /// Asserts that the response body does not contain the specified substring.
    #[must_use]
    pub fn assert_body_not_contains(self, unexpected: &str) -> Self {
        let body = self.body_string();
        assert!(
            !body.contains(unexpected),
            "Expected body to NOT contain '{unexpected}' but got:\n{body}"
        );
        self
    }

    /// Asserts that the response body is empty.
    #[must_use]
    pub fn assert_body_empty(self) -> Self {
        assert!(
            self.body.is_empty(),
            "Expected empty body but got {} bytes",
            self.body.len()
        );
        self
    }

    /// Returns the body as a UTF-8 string.
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Counts the `<D:response>` elements in a multistatus body.
    #[must_use]
    pub fn count_multistatus_responses(&self) -> usize {
        self.body_string().matches("<D:response>").count()
    }

    /// Text of the first `<D:{name}>` element in the body.
    #[must_use]
    pub fn element_text(&self, name: &str) -> Option<String> {
        let body = self.body_string();
        let open = format!("<D:{name}>");
        let close = format!("</D:{name}>");
        let start = body.find(&open)? + open.len();
        let end = body[start..].find(&close)? + start;
        Some(body[start..end].to_string())
    }
}
