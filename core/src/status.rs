//! Status codes reported for failures that never produced an HTTP status.
//!
//! The negative values follow the platform URL-loading error codes so that
//! `ClientError::status_code` is always populated and callers can branch on
//! it without matching variants.

/// The request timed out. A transport may report this as the response status.
pub const TIMED_OUT: i32 = -1001;

/// The server could not be reached.
pub const NOT_CONNECTED_TO_INTERNET: i32 = -1009;

/// The body could not be decoded into the requested type.
pub const CANNOT_DECODE_RAW_DATA: i32 = -1015;

pub const BAD_REQUEST: i32 = 400;
