//! Size-capped request body reading.

use salvo::Request;
use salvo::http::header::CONTENT_LENGTH;

use kunai_service::ServiceError;

/// ## Summary
/// Reads the request body, refusing anything over `limit` bytes.
///
/// A declared `Content-Length` above the limit is rejected before any byte
/// is read; bodies without one are read with the same cap.
///
/// ## Errors
/// Returns `RequestTooLarge` when the body exceeds `limit`.
pub async fn read_bounded(req: &mut Request, limit: u64) -> Result<Vec<u8>, ServiceError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit) {
        tracing::debug!(?declared, limit, "Declared body length over limit");
        return Err(ServiceError::RequestTooLarge { limit });
    }

    let cap = usize::try_from(limit).unwrap_or(usize::MAX);
    match req.payload_with_max_size(cap).await {
        Ok(bytes) => Ok(bytes.to_vec()),
        Err(e) => {
            tracing::debug!(error = %e, limit, "Request body rejected while reading");
            Err(ServiceError::RequestTooLarge { limit })
        }
    }
}

/// ## Summary
/// Reads a bounded body and decodes it as UTF-8 text.
///
/// ## Errors
/// Returns `RequestTooLarge` over the limit and `BadRequest` for invalid UTF-8.
pub async fn read_text(req: &mut Request, limit: u64) -> Result<String, ServiceError> {
    let bytes = read_bounded(req, limit).await?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::BadRequest(format!("request body is not UTF-8: {e}")))
}
