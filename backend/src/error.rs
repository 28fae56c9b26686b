use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::{error, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackCheckError {
    /// Required metadata is missing; nothing was stored.
    #[error("Please fill in the required field(s): {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Invalid measurement: {0}")]
    InvalidReading(String),

    #[error("Photo could not be read: {0}")]
    Encoding(String),

    #[error("Database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Photo bundle failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Access password missing or incorrect")]
    Unauthorized,
}

impl BackCheckError {
    pub fn status(&self) -> StatusCode {
        match self {
            BackCheckError::Validation { .. }
            | BackCheckError::InvalidReading(_)
            | BackCheckError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BackCheckError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BackCheckError::Unauthorized => StatusCode::UNAUTHORIZED,
            BackCheckError::Persistence(_)
            | BackCheckError::Io(_)
            | BackCheckError::Csv(_)
            | BackCheckError::Zip(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs a failed operation: rejected input as a warning, anything else as an error.
    pub fn log(&self, operation: &str) {
        if self.status().is_client_error() {
            warn!("{} rejected: {}", operation, self);
        } else {
            error!("{} failed: {}", operation, self);
        }
    }
}

impl actix_web::ResponseError for BackCheckError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).body(format!("Error: {}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_fields() {
        let err = BackCheckError::Validation {
            missing: vec!["woreda".to_string(), "checker_fa_name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Please fill in the required field(s): woreda, checker_fa_name"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_is_server_error() {
        let err = BackCheckError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(BackCheckError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
