//! Query and sync engine for CalDAV and CardDAV collections.
//!
//! ## Module Organization
//!
//! - `collection`: stored collections and the generated birthday calendar
//! - `context`: per-request store, settings and principal
//! - `error`: service errors and their HTTP status mapping
//! - `filter`: `calendar-query` and `addressbook-query` evaluation
//! - `freebusy`: busy-period aggregation for `free-busy-query`
//! - `path`: DAV URL classification
//! - `propfind`: PROPFIND
//! - `props`: property values for principals, homes, collections and resources
//! - `report`: REPORT dispatch
//! - `resolve`: loading the object a path names
//! - `resource`: GET, PUT and DELETE
//! - `sync`: sync tokens and change sets
//! - `text_match`: collation-aware text matching

pub mod collection;
pub mod context;
pub mod error;
pub mod filter;
pub mod freebusy;
pub mod path;
pub mod propfind;
pub mod props;
pub mod report;
pub mod resolve;
pub mod resource;
pub mod sync;
pub mod text_match;

pub use context::DavContext;
pub use error::{ServiceError, ServiceResult};
pub use path::{DavPath, HomeKind};
pub use propfind::propfind;
pub use report::{ReportOutcome, execute_report};
pub use resource::{FetchedResource, delete_resource, get_resource, put_resource};
