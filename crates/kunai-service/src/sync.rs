//! Sync tokens and change computation for `sync-collection` (RFC 6578).
//!
//! A token is `urn:kunai:sync:{payload}:{check}` where `payload` is the
//! unpadded base64url encoding of `kind:id:micros` and `check` is a salted
//! SHA-256 prefix over the payload. Tokens are only accepted for the
//! collection that issued them.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use kunai_core::types::CollectionKind;
use kunai_store::Resource;
use sha2::{Digest, Sha256};

use crate::collection::Collection;
use crate::error::{ServiceError, ServiceResult};

const TOKEN_PREFIX: &str = "urn:kunai:sync:";
/// Hex digits of checksum kept in a token.
const CHECK_LEN: usize = 16;

/// A decoded sync token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncToken {
    pub kind: CollectionKind,
    pub collection_id: u64,
    pub watermark: DateTime<Utc>,
}

/// Encodes and validates tokens under a deployment-specific salt.
#[derive(Debug, Clone)]
pub struct SyncTokenCodec {
    salt: String,
}

impl SyncTokenCodec {
    #[must_use]
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    fn checksum(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update([0]);
        hasher.update(payload.as_bytes());
        let mut check = hex::encode(hasher.finalize());
        check.truncate(CHECK_LEN);
        check
    }

    #[must_use]
    pub fn encode(&self, token: &SyncToken) -> String {
        let plain = format!(
            "{}:{}:{}",
            token.kind.as_str(),
            token.collection_id,
            token.watermark.timestamp_micros()
        );
        let payload = URL_SAFE_NO_PAD.encode(plain.as_bytes());
        let check = self.checksum(&payload);
        format!("{TOKEN_PREFIX}{payload}:{check}")
    }

    /// ## Summary
    /// Decodes a token produced by [`SyncTokenCodec::encode`].
    ///
    /// ## Errors
    /// Returns `InvalidSyncToken` for anything else, including tokens whose
    /// checksum does not match.
    pub fn decode(&self, token: &str) -> ServiceResult<SyncToken> {
        let invalid = |reason: &str| ServiceError::InvalidSyncToken(reason.to_string());

        let body = token
            .trim()
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| invalid("unrecognized token format"))?;
        let (payload, check) = body
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing checksum"))?;
        if check != self.checksum(payload) {
            return Err(invalid("checksum mismatch"));
        }

        let plain = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| invalid("undecodable payload"))?;

        let mut parts = plain.split(':');
        let (Some(kind), Some(id), Some(micros), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("malformed payload"));
        };

        let kind = CollectionKind::parse(kind).map_err(|_| invalid("unknown collection kind"))?;
        let collection_id = id.parse().map_err(|_| invalid("bad collection id"))?;
        let watermark = micros
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_micros)
            .ok_or_else(|| invalid("bad watermark"))?;

        Ok(SyncToken {
            kind,
            collection_id,
            watermark,
        })
    }
}

/// One entry of a change set, ordered by when it happened.
#[derive(Debug, Clone)]
pub enum Change {
    /// Created or modified since the watermark.
    Upsert(Resource),
    /// Deleted since the watermark.
    Deleted { name: String, at: DateTime<Utc> },
}

impl Change {
    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Upsert(resource) => resource.last_modified,
            Self::Deleted { at, .. } => *at,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Upsert(resource) => &resource.name,
            Self::Deleted { name, .. } => name,
        }
    }
}

/// Result of [`diff`].
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// Changes in time order.
    pub changes: Vec<Change>,
    /// Watermark to encode in the next token.
    pub watermark: DateTime<Utc>,
    /// Whether `changes` was cut short by a limit.
    pub truncated: bool,
}

impl ChangeSet {
    /// ## Summary
    /// Keeps the first `limit` changes and moves the watermark back to the
    /// last one kept, so the next sync resumes where this one stopped. A
    /// limit of zero is read as one.
    #[must_use]
    pub fn truncate(mut self, limit: usize) -> Self {
        let limit = limit.max(1);
        if self.changes.len() <= limit {
            return self;
        }
        // Changes sharing a timestamp with the cut point are kept together.
        if let Some(cut_at) = self.changes.get(limit - 1).map(Change::at) {
            self.changes.retain(|c| c.at() <= cut_at);
            self.watermark = cut_at;
        }
        self.truncated = true;
        self
    }
}

/// ## Summary
/// The collection's current watermark: the newest change it knows of.
///
/// ## Errors
/// Returns an error if the collection cannot be read.
pub async fn current_watermark(
    collection: &dyn Collection,
    resources: &[Resource],
) -> ServiceResult<DateTime<Utc>> {
    let horizon = collection.retention_horizon().await?;
    let deletions = collection.tombstones_since(horizon).await?;
    Ok(resources
        .iter()
        .map(|r| r.last_modified)
        .chain(deletions.iter().map(|t| t.deleted_at))
        .fold(horizon, std::cmp::max))
}

/// ## Summary
/// Token for the collection's current state, as advertised in `DAV:sync-token`.
///
/// ## Errors
/// Returns an error if the collection cannot be read.
pub async fn current_token(
    codec: &SyncTokenCodec,
    collection: &dyn Collection,
    resources: &[Resource],
) -> ServiceResult<String> {
    let record = collection.record();
    Ok(codec.encode(&SyncToken {
        kind: record.kind,
        collection_id: record.id,
        watermark: current_watermark(collection, resources).await?,
    }))
}

/// ## Summary
/// Validates a client token against `collection` and returns its watermark.
///
/// An empty token is an initial sync and yields `None`.
///
/// ## Errors
/// Returns `InvalidSyncToken` when the token is malformed, was issued for
/// another collection, predates the retention horizon, or lies in the future.
pub async fn resolve_token(
    codec: &SyncTokenCodec,
    collection: &dyn Collection,
    current: DateTime<Utc>,
    token: &str,
) -> ServiceResult<Option<DateTime<Utc>>> {
    if token.trim().is_empty() {
        return Ok(None);
    }

    let decoded = codec.decode(token)?;
    let record = collection.record();
    if decoded.kind != record.kind || decoded.collection_id != record.id {
        return Err(ServiceError::InvalidSyncToken(
            "token was issued for another collection".to_string(),
        ));
    }
    if decoded.watermark < collection.retention_horizon().await? {
        return Err(ServiceError::InvalidSyncToken(
            "token predates the retention horizon".to_string(),
        ));
    }
    if decoded.watermark > current {
        return Err(ServiceError::InvalidSyncToken(
            "token is newer than the collection".to_string(),
        ));
    }
    Ok(Some(decoded.watermark))
}

/// ## Summary
/// Computes changes after `since`.
///
/// Without a watermark every live resource is reported and no deletions.
/// Otherwise resources modified strictly after `since` and deletions
/// recorded strictly after it are reported, in time order.
///
/// ## Errors
/// Returns an error if the collection cannot be read.
pub async fn diff(
    collection: &dyn Collection,
    resources: Vec<Resource>,
    since: Option<DateTime<Utc>>,
) -> ServiceResult<ChangeSet> {
    let watermark = current_watermark(collection, &resources).await?;

    let mut changes: Vec<Change> = match since {
        None => resources.into_iter().map(Change::Upsert).collect(),
        Some(since) => {
            let mut changes: Vec<Change> = resources
                .into_iter()
                .filter(|r| r.last_modified > since)
                .map(Change::Upsert)
                .collect();
            let live: Vec<String> = changes.iter().map(|c| c.name().to_string()).collect();
            changes.extend(
                collection
                    .tombstones_since(since)
                    .await?
                    .into_iter()
                    .filter(|t| !live.contains(&t.name))
                    .map(|t| Change::Deleted {
                        name: t.name,
                        at: t.deleted_at,
                    }),
            );
            changes
        }
    };
    changes.sort_by(|a, b| a.at().cmp(&b.at()).then_with(|| a.name().cmp(b.name())));

    Ok(ChangeSet {
        changes,
        watermark,
        truncated: false,
    })
}
