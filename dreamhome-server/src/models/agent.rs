use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub agent_id: i64,
    pub agent_data: AgentData,
    pub office_id: i64,
    #[serde(default)]
    pub properties: Vec<AgentProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
    #[serde(rename = "agentFN")]
    pub first: String,
    #[serde(rename = "agentLN")]
    pub last: String,
    #[serde(rename = "agentLicense")]
    pub license: String,
}

/// A listing the agent handles for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProperty {
    pub property_id: i64,
    pub client_id: i64,
    pub property_state: i32,
}
