//! Request-side helpers: DAV context, bounded bodies and headers.

pub mod body;
pub mod context;
pub mod headers;
