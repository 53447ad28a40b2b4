//! HTTP status hints for transports that want them.
//!
//! The dispatcher itself never sends these anywhere; they are derived from
//! responses via [`Response::http_status`](crate::response::Response::http_status)
//! as a convenience for HTTP-shaped hosts.

pub const HTTP_OK: u16 = 200;
pub const HTTP_NO_CONTENT: u16 = 204;
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_INTERNAL_ERROR: u16 = 500;

/// Status for an error response, keyed by the error code.
pub fn for_error_code(code: i64) -> u16 {
    match code {
        -32700 | -32600 | -32602 => HTTP_BAD_REQUEST,
        -32601 => HTTP_NOT_FOUND,
        _ => HTTP_INTERNAL_ERROR,
    }
}

/// Reason phrase for the handful of statuses a dispatch can produce.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        HTTP_OK => "OK",
        HTTP_NO_CONTENT => "No Content",
        HTTP_BAD_REQUEST => "Bad Request",
        HTTP_NOT_FOUND => "Not Found",
        HTTP_INTERNAL_ERROR => "Internal Server Error",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason_phrase(HTTP_OK), "OK");
        assert_eq!(reason_phrase(HTTP_NO_CONTENT), "No Content");
        assert_eq!(reason_phrase(418), "Unknown");
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(for_error_code(-32700), HTTP_BAD_REQUEST);
        assert_eq!(for_error_code(-32600), HTTP_BAD_REQUEST);
        assert_eq!(for_error_code(-32601), HTTP_NOT_FOUND);
        assert_eq!(for_error_code(-32602), HTTP_BAD_REQUEST);
        assert_eq!(for_error_code(-32603), HTTP_INTERNAL_ERROR);
        assert_eq!(for_error_code(40001), HTTP_INTERNAL_ERROR);
    }
}
