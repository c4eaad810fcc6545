//! Wire schema of API responses, parsed and validated at the boundary.

use attendify_core::PageResult;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, DecodeError};

/// Fallback used when an error body carries no message.
const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
    meta: ListMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMeta {
    total: u64,
    total_pages: u64,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Detailed {
        message: String,
        #[serde(default)]
        details: Option<serde_json::Value>,
    },
    Plain(String),
}

/// Parses a `{ data: T[], meta: { total, totalPages } }` body.
///
/// # Errors
/// Returns `DecodeError` if the body is not valid JSON of that shape or the
/// totals contradict the rows.
pub(crate) fn decode_page<T: DeserializeOwned>(
    body: &str,
    context: &str,
) -> Result<PageResult<T>, DecodeError> {
    let envelope: ListEnvelope<T> = parse(body, context)?;
    let ListEnvelope { data, meta } = envelope;
    let rows = data.len() as u64;

    if rows > meta.total {
        return Err(inconsistent(
            context,
            "meta.total",
            format!("{} rows returned but total is {}", rows, meta.total),
        ));
    }
    if meta.total > 0 && meta.total_pages == 0 {
        return Err(inconsistent(
            context,
            "meta.totalPages",
            format!("total is {} but totalPages is 0", meta.total),
        ));
    }
    if meta.total_pages > meta.total.max(1) {
        return Err(inconsistent(
            context,
            "meta.totalPages",
            format!("{} pages for {} rows", meta.total_pages, meta.total),
        ));
    }

    Ok(PageResult { items: data, total: meta.total, total_pages: meta.total_pages })
}

/// Parses a `{ data: T }` body.
pub(crate) fn decode_data<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, DecodeError> {
    let envelope: DataEnvelope<T> = parse(body, context)?;
    Ok(envelope.data)
}

/// Builds an `ApiError::Status` from a non-success response body.
///
/// Understands `{ error: { message, details? } }` and `{ error: "message" }`;
/// any other JSON body is kept as details.
pub(crate) fn error_from_body(status: u16, body: &str) -> ApiError {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let (message, details) = match envelope.error {
            ErrorPayload::Detailed { message, details } => (message, details),
            ErrorPayload::Plain(message) => (message, None),
        };
        return ApiError::Status { status, message, details };
    }

    let details = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = details
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned(), str::to_owned);
    ApiError::Status { status, message, details }
}

fn parse<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body)
        .map_err(|source| DecodeError::Json { context: context.to_owned(), source })
}

fn inconsistent(context: &str, field: &'static str, reason: String) -> DecodeError {
    DecodeError::Inconsistent { context: context.to_owned(), field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn test_decode_valid_page() {
        let body = r#"{"data":[{"id":"a"},{"id":"b"}],"meta":{"total":12,"totalPages":2}}"#;
        let page: PageResult<Row> = decode_page(body, "GET /group").unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_decode_empty_page() {
        let body = r#"{"data":[],"meta":{"total":0,"totalPages":0}}"#;
        let page: PageResult<Row> = decode_page(body, "GET /group").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_single_empty_page_is_accepted() {
        let body = r#"{"data":[],"meta":{"total":0,"totalPages":1}}"#;
        let page: PageResult<Row> = decode_page(body, "GET /group").unwrap();
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_more_pages_than_rows_is_rejected() {
        let body = r#"{"data":[{"id":"a"}],"meta":{"total":1,"totalPages":4}}"#;
        assert!(decode_page::<Row>(body, "GET /group").is_err());
    }

    #[test]
    fn test_missing_meta_is_rejected() {
        let err = decode_page::<Row>(r#"{"data":[]}"#, "GET /group").unwrap_err();
        assert!(matches!(err, DecodeError::Json { .. }));
    }

    #[test]
    fn test_negative_total_is_rejected() {
        let body = r#"{"data":[],"meta":{"total":-1,"totalPages":0}}"#;
        assert!(decode_page::<Row>(body, "GET /group").is_err());
    }

    #[test]
    fn test_mistyped_row_is_rejected() {
        let body = r#"{"data":[{"id":5}],"meta":{"total":1,"totalPages":1}}"#;
        assert!(matches!(decode_page::<Row>(body, "GET /group"), Err(DecodeError::Json { .. })));
    }

    #[test]
    fn test_more_rows_than_total_is_rejected() {
        let body = r#"{"data":[{"id":"a"},{"id":"b"}],"meta":{"total":1,"totalPages":1}}"#;
        let err = decode_page::<Row>(body, "GET /group").unwrap_err();
        assert!(matches!(err, DecodeError::Inconsistent { field: "meta.total", .. }));
    }

    #[test]
    fn test_rows_without_pages_is_rejected() {
        let body = r#"{"data":[{"id":"a"}],"meta":{"total":1,"totalPages":0}}"#;
        let err = decode_page::<Row>(body, "GET /group").unwrap_err();
        assert!(matches!(err, DecodeError::Inconsistent { field: "meta.totalPages", .. }));
    }

    #[test]
    fn test_decode_data() {
        let row: Row = decode_data(r#"{"data":{"id":"x"},"status":200}"#, "GET /auth/me").unwrap();
        assert_eq!(row, Row { id: "x".to_owned() });
    }

    #[test]
    fn test_error_body_detailed() {
        let body = r#"{"error":{"message":"Group name already exists","details":{"field":"name"}}}"#;
        let err = error_from_body(422, body);
        assert_eq!(err.message(), "Group name already exists");
        assert_eq!(err.details(), Some(&serde_json::json!({"field": "name"})));
    }

    #[test]
    fn test_error_body_plain() {
        let err = error_from_body(404, r#"{"error":"group not found"}"#);
        assert_eq!(err.message(), "group not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_body_unstructured() {
        let err = error_from_body(500, "<html>oops</html>");
        assert_eq!(err.message(), UNKNOWN_ERROR_MESSAGE);
        assert!(err.details().is_none());

        let err = error_from_body(400, r#"{"message":"bad"}"#);
        assert_eq!(err.message(), "bad");
        assert!(err.details().is_some());
    }
}
