//! Response writers shared by the method handlers.

pub mod error;
pub mod multistatus;

use salvo::Response;
use salvo::http::HeaderValue;

/// ## Summary
/// Sets a response header, logging values that are not valid header text.
pub fn set_header(res: &mut Response, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            if let Err(e) = res.add_header(name, value, true) {
                tracing::warn!(header = name, error = %e, "Failed to set response header");
            }
        }
        Err(e) => tracing::warn!(header = name, error = %e, "Invalid response header value"),
    }
}
