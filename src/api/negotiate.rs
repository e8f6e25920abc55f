//! Content negotiation (spec.md §4.I, §6): the gateway only ever emits
//! `application/ld+json`; it accepts requests that declare they can take
//! that, plain `application/json`, or no preference at all, and rejects
//! everything else with 406.

use axum::http::HeaderMap;

use super::error::ApiError;

pub const CONTENT_TYPE: &str = "application/ld+json";

/// `negotiate(accept)` (spec.md §4.I): absent header or `*/*` both count
/// as "no preference."
pub fn negotiate(headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(accept) = headers.get(axum::http::header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return Ok(());
    };

    let acceptable = accept.split(',').map(str::trim).any(|part| {
        let media = part.split(';').next().unwrap_or("").trim();
        matches!(media, "*/*" | "application/*" | "application/ld+json" | "application/json" | "")
    });

    if acceptable {
        Ok(())
    } else {
        Err(ApiError::NotAcceptable(format!(
            "unsupported Accept header: {accept}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_accept_is_acceptable() {
        let headers = HeaderMap::new();
        assert!(negotiate(&headers).is_ok());
    }

    #[test]
    fn wildcard_accept_is_acceptable() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::ACCEPT, "*/*".parse().unwrap());
        assert!(negotiate(&headers).is_ok());
    }

    #[test]
    fn unsupported_accept_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::ACCEPT, "text/csv".parse().unwrap());
        assert!(negotiate(&headers).is_err());
    }
}
