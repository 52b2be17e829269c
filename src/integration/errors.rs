use serde::Serialize;

use crate::extraction::types::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// The user can fix it, usually by opening a listing page.
    UserRecoverable,
    SystemError,
    Transient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("[{code}] {technical_message}")]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: &'static str,
    pub user_message: String,
    pub technical_message: String,
    pub is_retryable: bool,
}

pub fn to_app_error(error: &ParseError) -> AppError {
    match error {
        ParseError::NoDataFound => AppError {
            category: ErrorCategory::UserRecoverable,
            code: "E001",
            user_message: "No price information was found on screen.\n\n\
                           Make sure a real-estate listing page is open."
                .to_string(),
            technical_message: "No numeric data found in extracted texts".to_string(),
            is_retryable: true,
        },
        ParseError::InsufficientData => AppError {
            category: ErrorCategory::UserRecoverable,
            code: "E002",
            user_message: "Both the house price and the rent are needed.\n\n\
                           Only one of them was found. Check the listing details."
                .to_string(),
            technical_message: "Only partial data found (price or rent missing)".to_string(),
            is_retryable: true,
        },
        ParseError::InvalidFormat => AppError {
            category: ErrorCategory::UserRecoverable,
            code: "E003",
            user_message: "The values found could not be converted to numbers.\n\n\
                           Make sure the prices are visible on screen."
                .to_string(),
            technical_message: "Text to number parsing failed".to_string(),
            is_retryable: true,
        },
        ParseError::UnexpectedError(message) => AppError {
            category: ErrorCategory::SystemError,
            code: "E999",
            user_message: "An unexpected error occurred.\n\nPlease restart the application.".to_string(),
            technical_message: message.clone(),
            is_retryable: false,
        },
    }
}

pub fn calculation_failed(message: &str) -> AppError {
    AppError {
        category: ErrorCategory::SystemError,
        code: "E200",
        user_message: "Something went wrong during the calculation.\n\n\
                       Please check the values that were read."
            .to_string(),
        technical_message: format!("Calculation engine error: {}", message),
        is_retryable: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_recoverable_codes() {
        for (error, code) in [
            (ParseError::NoDataFound, "E001"),
            (ParseError::InsufficientData, "E002"),
            (ParseError::InvalidFormat, "E003"),
        ] {
            let app_error = to_app_error(&error);
            assert_eq!(app_error.code, code);
            assert_eq!(app_error.category, ErrorCategory::UserRecoverable);
            assert!(app_error.is_retryable);
            assert!(!app_error.user_message.is_empty());
        }
    }

    #[test]
    fn test_unexpected_error_is_not_retryable() {
        let app_error = to_app_error(&ParseError::UnexpectedError("service offline".to_string()));
        assert_eq!(app_error.code, "E999");
        assert_eq!(app_error.category, ErrorCategory::SystemError);
        assert!(!app_error.is_retryable);
        assert_eq!(app_error.technical_message, "service offline");
        assert_eq!(app_error.to_string(), "[E999] service offline");
    }

    #[test]
    fn test_calculation_failed() {
        let app_error = calculation_failed("house_price must be positive");
        assert_eq!(app_error.code, "E200");
        assert!(app_error.is_retryable);
        assert!(app_error.technical_message.ends_with("house_price must be positive"));
    }
}
