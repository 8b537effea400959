use serde::{Deserialize, Serialize};

use super::Address;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub client_id: i64,
    pub client_name: ClientName,
    pub client_addr: Address,
    pub agent_id: i64,
    #[serde(default)]
    pub suggested_properties: Vec<SuggestedProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientName {
    #[serde(rename = "clientFN")]
    pub first: String,
    #[serde(rename = "clientLN")]
    pub last: String,
}

/// A property an agent has put in front of a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedProperty {
    pub property_id: i64,
    pub property_state: i32,
    pub rating: i32,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment: String,
}
