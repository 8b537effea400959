//! Response envelope shared by every JSON route
//!
//! Each body carries an `RC` return code alongside its payload.

use serde::Serialize;

pub const RC_OK: i32 = 0;
pub const RC_WARNING: i32 = 1;
pub const RC_ERROR: i32 = 2;

/// `{"RC": <code>, ...payload}`
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    #[serde(rename = "RC")]
    pub rc: i32,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self { rc: RC_OK, body }
    }

    pub fn warning(body: T) -> Self {
        Self {
            rc: RC_WARNING,
            body,
        }
    }
}

/// Payload of a bare success message
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: String,
}

impl Success {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
        }
    }
}

/// Payload of a collection listing
#[derive(Debug, Serialize)]
pub struct Items<T: Serialize> {
    pub items: Vec<T>,
}
