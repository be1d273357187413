use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use kunai_core::constants::{BIRTHDAY_CALENDAR_SLUG, ICS_EXTENSION, PRODUCT_ID, VCF_EXTENSION};
use kunai_core::types::{AccessMode, CollectionKind};
use kunai_rfc::rfc::ical::{Component, ContentLine, Parameter};
use kunai_rfc::rfc::vcard::{birthday, parse_vcards};
use kunai_store::etag::{generate_ctag, generate_etag};
use kunai_store::{Collection as CollectionRecord, DavStore, PutOutcome, Resource, Tombstone};
use sha2::{Digest, Sha256};

use super::Collection;
use crate::error::{ServiceError, ServiceResult};

/// A contact as seen by the birthday calendar.
struct Contact {
    /// Birthday event name, e.g. `friends-jane.ics`.
    name: String,
    last_modified: DateTime<Utc>,
    event: Option<Resource>,
}

/// ## Summary
/// Read-only calendar with one yearly all-day event per contact `BDAY`.
///
/// Computed on load from every address book in the owner's home. Its
/// change history is that of the underlying contacts: a deleted contact,
/// or one whose `BDAY` was removed, surfaces as a deleted event.
pub struct BirthdayCalendar {
    store: Arc<dyn DavStore>,
    record: CollectionRecord,
    address_books: Vec<CollectionRecord>,
    contacts: Vec<Contact>,
}

impl BirthdayCalendar {
    /// Stable ID of `owner`'s birthday calendar.
    #[must_use]
    pub fn collection_id(owner: &str) -> u64 {
        let digest = Sha256::digest(format!("birthdays:{owner}").as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }

    /// ## Summary
    /// Builds the calendar from the owner's address books.
    ///
    /// Cards that fail to parse are skipped.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    #[tracing::instrument(skip(store))]
    pub async fn load(store: Arc<dyn DavStore>, owner: &str) -> ServiceResult<Self> {
        let id = Self::collection_id(owner);
        let address_books = store.collections(owner, CollectionKind::Addressbook).await?;

        let mut contacts = Vec::new();
        for book in &address_books {
            for card in store.resources(book.id).await? {
                let name = event_name(&book.slug, &card.name);
                let event = birthday_event(id, &name, &card);
                contacts.push(Contact {
                    name,
                    last_modified: card.last_modified,
                    event,
                });
            }
        }

        let events: Vec<&Resource> = contacts.iter().filter_map(|c| c.event.as_ref()).collect();
        let updated_at = contacts
            .iter()
            .map(|c| c.last_modified)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let record = CollectionRecord {
            id,
            owner: owner.to_string(),
            slug: BIRTHDAY_CALENDAR_SLUG.to_string(),
            kind: CollectionKind::Birthdays,
            display_name: Some("Birthdays".to_string()),
            description: Some("Birthdays of your contacts".to_string()),
            timezone: None,
            access: AccessMode::ReadOnly,
            ctag: generate_ctag(events.iter().map(|e| (e.name.as_str(), e.etag.as_str()))),
            updated_at,
        };

        tracing::debug!(
            address_books = address_books.len(),
            events = events.len(),
            "Birthday calendar loaded"
        );

        Ok(Self {
            store,
            record,
            address_books,
            contacts,
        })
    }
}

#[async_trait]
impl Collection for BirthdayCalendar {
    fn record(&self) -> &CollectionRecord {
        &self.record
    }

    async fn resources(&self) -> ServiceResult<Vec<Resource>> {
        let mut events: Vec<Resource> = self
            .contacts
            .iter()
            .filter_map(|c| c.event.clone())
            .collect();
        events.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(events)
    }

    async fn resource(&self, name: &str) -> ServiceResult<Option<Resource>> {
        Ok(self
            .contacts
            .iter()
            .filter_map(|c| c.event.as_ref())
            .find(|e| e.name == name)
            .cloned())
    }

    async fn tombstones_since(&self, since: DateTime<Utc>) -> ServiceResult<Vec<Tombstone>> {
        let mut tombstones = Vec::new();
        for book in &self.address_books {
            for deleted in self.store.tombstones_since(book.id, since).await? {
                tombstones.push(Tombstone {
                    collection_id: self.record.id,
                    name: event_name(&book.slug, &deleted.name),
                    deleted_at: deleted.deleted_at,
                });
            }
        }

        // The store keeps no prior card versions, so a contact without a
        // BDAY that changed after `since` is reported as removed whether or
        // not it ever had one.
        tombstones.extend(
            self.contacts
                .iter()
                .filter(|c| c.event.is_none() && c.last_modified > since)
                .map(|c| Tombstone {
                    collection_id: self.record.id,
                    name: c.name.clone(),
                    deleted_at: c.last_modified,
                }),
        );
        Ok(tombstones)
    }

    async fn retention_horizon(&self) -> ServiceResult<DateTime<Utc>> {
        let mut horizon = DateTime::<Utc>::UNIX_EPOCH;
        for book in &self.address_books {
            horizon = horizon.max(self.store.retention_horizon(book.id).await?);
        }
        Ok(horizon)
    }

    async fn put(&self, _name: &str, _body: String) -> ServiceResult<PutOutcome> {
        Err(ServiceError::read_only("the birthday calendar is generated"))
    }

    async fn delete(&self, _name: &str) -> ServiceResult<bool> {
        Err(ServiceError::read_only("the birthday calendar is generated"))
    }
}

fn event_name(book_slug: &str, card_name: &str) -> String {
    let stem = card_name.strip_suffix(VCF_EXTENSION).unwrap_or(card_name);
    format!("{book_slug}-{stem}{ICS_EXTENSION}")
}

fn birthday_event(collection_id: u64, name: &str, card: &Resource) -> Option<Resource> {
    let vcard = match parse_vcards(&card.body) {
        Ok(mut cards) => cards.remove(0),
        Err(e) => {
            tracing::warn!(card = %card.name, error = %e, "Skipping unparsable contact");
            return None;
        }
    };
    let date = birthday(&vcard)?.anchor_date()?;
    let full_name = vcard
        .property("FN")
        .map(ContentLine::text_value)
        .unwrap_or_default();
    let uid = vcard
        .uid()
        .map_or_else(|| name.trim_end_matches(ICS_EXTENSION).to_string(), str::to_string);

    let body = render_event(&uid, &full_name, date, card.last_modified)?;
    Some(Resource {
        collection_id,
        name: name.to_string(),
        etag: generate_etag(body.as_bytes()),
        body,
        last_modified: card.last_modified,
    })
}

fn render_event(
    contact_uid: &str,
    full_name: &str,
    date: NaiveDate,
    stamp: DateTime<Utc>,
) -> Option<String> {
    let plain = |name: &str, value: String| ContentLine::generated(name, Vec::new(), value);
    let date_line = |name: &str, value: NaiveDate| {
        ContentLine::generated(
            name,
            vec![Parameter::new("VALUE", "DATE")],
            value.format("%Y%m%d").to_string(),
        )
    };

    let summary = if full_name.is_empty() {
        "Birthday".to_string()
    } else {
        format!("{full_name}'s birthday")
    };

    let mut event = Component::new("VEVENT");
    event.push_property(plain("UID", format!("birthday-{contact_uid}")));
    event.push_property(plain("DTSTAMP", stamp.format("%Y%m%dT%H%M%SZ").to_string()));
    event.push_property(date_line("DTSTART", date));
    event.push_property(date_line("DTEND", date.checked_add_days(Days::new(1))?));
    event.push_property(plain("RRULE", "FREQ=YEARLY".to_string()));
    event.push_property(plain("SUMMARY", escape_text(&summary)));
    event.push_property(plain("TRANSP", "TRANSPARENT".to_string()));

    let mut calendar = Component::new("VCALENDAR");
    calendar.push_property(plain("VERSION", "2.0".to_string()));
    calendar.push_property(plain("PRODID", PRODUCT_ID.to_string()));
    calendar.push_component(event);
    Some(calendar.to_text())
}

/// TEXT escaping (RFC 5545 §3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ';' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
