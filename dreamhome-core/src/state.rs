//! Connection state machine values

use std::fmt;

use serde::Serialize;

/// Lifecycle of the single store connection.
///
/// ```text
/// Disconnected --connect--> Connecting --ok--> Connected
///                           Connecting --err/timeout--> Failed
/// Failed --connect--> Connecting
/// Connected --disconnect event--> Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    /// A connect attempt has concluded (or none is running).
    pub fn is_settled(self) -> bool {
        self != Self::Connecting
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
