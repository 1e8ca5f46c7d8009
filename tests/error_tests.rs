// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use fintrack::error::{ApiError, ErrorShape, NETWORK_ERROR_MESSAGE};
use serde_json::json;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        ApiError::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
        },
        ApiError::from_response(500, ""),
        ApiError::from_response(401, r#"{"detail": "expired"}"#),
        ApiError::NoRefreshToken,
        ApiError::Decode("bad json".to_string()),
        ApiError::Storage("disk full".to_string()),
        ApiError::Config("no base url".to_string()),
    ];

    for error in errors {
        assert!(!format!("{}", error).is_empty());
        assert!(!error.message().is_empty());
    }
}

#[test]
fn test_shape_of_backend_error() {
    let err = ApiError::from_response(
        422,
        r#"{"message": "Validation failed", "details": {"amount": ["must be positive"]}}"#,
    );
    let shape = serde_json::to_value(ErrorShape::from(&err)).unwrap();

    assert_eq!(
        shape,
        json!({
            "message": "Validation failed",
            "status": 422,
            "details": {"amount": ["must be positive"]}
        })
    );
}

#[test]
fn test_shape_of_network_error_omits_status() {
    let err = ApiError::Network {
        message: NETWORK_ERROR_MESSAGE.to_string(),
    };
    let shape = serde_json::to_value(ErrorShape::from(&err)).unwrap();

    assert_eq!(shape, json!({"message": NETWORK_ERROR_MESSAGE}));
}

#[test]
fn test_unauthorized_maps_to_auth_expired() {
    let err = ApiError::from_response(401, "");
    assert!(err.is_auth_expired());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), "Request failed with status code 401");
}

#[test]
fn test_blank_message_falls_through_to_error_field() {
    let err = ApiError::from_response(409, r#"{"message": "  ", "error": "conflict"}"#);
    assert_eq!(err.message(), "conflict");
}

#[test]
fn test_all_blank_messages_use_generic_text() {
    let err = ApiError::from_response(
        409,
        r#"{"message": " ", "detail": "", "error": "", "details": ["duplicate name"]}"#,
    );
    assert_eq!(err.message(), "Request failed with status code 409");
    assert_eq!(err.details(), Some(&json!(["duplicate name"])));
}
