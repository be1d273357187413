//! `WebDAV`, `CalDAV` and `CardDAV` XML.

pub mod build;
pub mod core;
pub mod parse;
