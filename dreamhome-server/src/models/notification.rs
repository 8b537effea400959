use serde::{Deserialize, Serialize};

/// Pairs an agent with a client to be notified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: i64,
    pub agent_id: i64,
    pub client_id: i64,
}
