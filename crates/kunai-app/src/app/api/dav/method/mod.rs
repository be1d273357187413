// DAV methods served on every path under the DAV prefix.

pub mod delete;
pub mod get_head;
pub mod options;
pub mod propfind;
pub mod put;
pub mod report;
