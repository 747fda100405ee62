//! Test fixtures for shared error codes and envelopes.

use hwt_shared::{ErrorCode, ErrorEnvelope};

/// Return a list of common error codes used in tests.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::invalid_input(),
        ErrorCode::not_found(),
        ErrorCode::io(),
        ErrorCode::internal(),
        ErrorCode::quota_exceeded(),
        ErrorCode::storage_unavailable(),
    ]
}

/// An invalid input error fixture.
pub fn invalid_input_error() -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid input")
}

/// A quota error fixture, as returned by a full storage medium.
pub fn quota_error() -> ErrorEnvelope {
    ErrorEnvelope::quota_exceeded("storage quota exceeded")
}

/// An unavailable-storage error fixture.
pub fn unavailable_error() -> ErrorEnvelope {
    ErrorEnvelope::storage_unavailable("storage unavailable")
}
