//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`]
//! and the JSON rendering used by every handler.

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            AppError::bad_request("invalid request body").with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// 一意制約違反の場合、違反した制約名を返す
///
/// エラーメッセージ文字列ではなく SQLSTATE (23505) と制約名で判定します。
/// 呼び出し側（各ドメインの infra 層）が制約名を型付きの重複エラーに変換します。
#[cfg(feature = "sqlx")]
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("record not found").with_source(err),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("database connection pool exhausted")
                    .with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = match db_err.code().as_deref() {
                    Some("23505") => AppError::conflict("duplicate key value"),
                    Some("23503") => AppError::conflict("foreign key violation"),
                    Some("23502") | Some("23514") => AppError::bad_request("constraint violation"),
                    Some("57P01") | Some("57P02") | Some("57P03") => {
                        AppError::service_unavailable("database unavailable")
                    }
                    _ => AppError::new(ErrorKind::InternalServerError, "database error"),
                };
                app_err.with_source(err)
            }
            sqlx::Error::Io(_) => {
                AppError::service_unavailable("database connection error").with_source(err)
            }
            _ => AppError::internal("database error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            tracing::error!(
                status = self.status_code(),
                error = %self,
                source = ?std::error::Error::source(&self).map(|e| e.to_string()),
                "Request failed"
            );
        }

        let mut body = serde_json::json!({ "error": self.public_message() });
        if let Some(detail) = self.detail() {
            body["message"] = serde_json::Value::from(detail);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::BadRequest);
        assert_eq!(app_err.message(), "invalid request body");
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_row_not_found_is_404() {
        let app_err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(app_err.kind(), ErrorKind::NotFound);
        assert!(unique_violation(&sqlx::Error::RowNotFound).is_none());
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_into_response_shape() {
        use axum::response::IntoResponse;
        use http_body_util::BodyExt;

        let response = AppError::internal("pool exploded")
            .with_detail("retry later")
            .into_response();
        assert_eq!(response.status().as_u16(), 500);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "internal server error");
        assert_eq!(json["message"], "retry later");
    }
}
