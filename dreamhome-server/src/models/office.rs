use serde::{Deserialize, Serialize};

use super::Address;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub office_id: i64,
    pub office_name: String,
    pub office_manager: String,
    pub office_addr: Address,
    pub num_properties: u32,
}
