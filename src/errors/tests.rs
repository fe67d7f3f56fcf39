//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(1, 9),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        Position(3, 14),
    );

    assert_eq!(*error.get_position(), Position(3, 14));
}

#[test]
fn test_error_format_line_column() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: ";".to_string(),
        },
        Position(2, 5),
    );

    let formatted = error.format();
    assert!(formatted.starts_with("<2:5>\t"));
    assert!(formatted.contains("unexpected token"));
}

#[test]
fn test_error_format_detailed_message() {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: "=".to_string(),
            message: "expected identifier after `let`".to_string(),
        },
        Position(1, 5),
    );

    assert!(error.format().contains("expected identifier after `let`"));
}
