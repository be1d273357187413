//! First-start provisioning for single-user deployments.

use kunai_core::config::{AuthMethod, Settings};
use kunai_core::types::CollectionKind;
use kunai_store::{DavStore, MemoryStore, NewCollection, Principal};

use crate::error::AppResult;

/// Slug of the calendar created for a fresh single user.
pub const DEFAULT_CALENDAR_SLUG: &str = "default";
/// Slug of the address book created for a fresh single user.
pub const DEFAULT_ADDRESSBOOK_SLUG: &str = "contacts";

/// ## Summary
/// Registers the configured single user and gives them one calendar and one
/// address book if their homes are empty. Proxy deployments are untouched.
///
/// ## Errors
/// Returns an error if the configured name is not a valid path segment or a
/// store write fails.
pub async fn bootstrap_single_user(store: &MemoryStore, settings: &Settings) -> AppResult<()> {
    let (AuthMethod::SingleUser, Some(user)) = (settings.auth.method, &settings.auth.single_user)
    else {
        return Ok(());
    };

    store
        .add_principal(Principal {
            name: user.name.clone(),
            display_name: user.name.clone(),
            email: Some(user.email.clone()),
        })
        .await?;

    for (kind, slug, display_name) in [
        (CollectionKind::Calendar, DEFAULT_CALENDAR_SLUG, "Calendar"),
        (CollectionKind::Addressbook, DEFAULT_ADDRESSBOOK_SLUG, "Contacts"),
    ] {
        if store.collections(&user.name, kind).await?.is_empty() {
            let created = store
                .create_collection(
                    NewCollection::new(user.name.as_str(), slug, kind)
                        .with_display_name(display_name),
                )
                .await?;
            tracing::info!(owner = %user.name, slug, id = created.id, "Created default collection");
        }
    }

    Ok(())
}
