//! HTTP handlers, one module per API surface area.
//!
//! Handlers stay thin: decode the external payload, call into
//! `medlab_db_mysql::queries`, map storage errors onto [`ApiError`].

pub mod activity;
pub mod catalog;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod settings;
pub mod sql_demo;

use chrono::NaiveDate;
use medlab_api::ApiError;
use medlab_db_mysql::StoreError;

/// Maps storage errors on read paths. Infrastructure failures are the
/// server's fault and surface as 500.
pub(crate) fn read_err(err: StoreError) -> ApiError {
    match err {
        StoreError::Invalid(msg) => ApiError::bad_request(msg),
        StoreError::NotFound(msg) => ApiError::not_found(msg),
        other => ApiError::internal(other.to_string()),
    }
}

/// Maps storage errors on write paths. Database rejections (for example a
/// foreign key pointing at a missing patient) surface as 400 with the
/// store message passed through.
pub(crate) fn write_err(err: StoreError) -> ApiError {
    match err {
        StoreError::Invalid(msg) => ApiError::bad_request(msg),
        StoreError::NotFound(msg) => ApiError::not_found(msg),
        other => ApiError::bad_request(other.to_string()),
    }
}

/// Parses an optional `YYYY-MM-DD` date. Empty strings read as absent.
pub(crate) fn parse_date_opt(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Invalid date: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parse_date_accepts_iso_dates() {
        let parsed = parse_date_opt(Some("1985-07-14")).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(1985, 7, 14));
    }

    #[test]
    fn parse_date_treats_empty_as_absent() {
        assert_eq!(parse_date_opt(Some("")).unwrap(), None);
        assert_eq!(parse_date_opt(None).unwrap(), None);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date_opt(Some("14/07/1985")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Invalid date: 14/07/1985");
    }

    #[test]
    fn read_and_write_paths_differ_on_infrastructure_errors() {
        assert_eq!(
            read_err(StoreError::schema("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            write_err(StoreError::schema("boom")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            read_err(StoreError::NotFound("Order not found".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            write_err(StoreError::invalid("Nothing to update")).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
