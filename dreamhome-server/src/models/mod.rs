//! DreamHome domain documents
//!
//! Field names serialize in the camelCase layout the web client expects.
//! Every document carries the numeric id allocated for it from the counter
//! named by [`Collection::counter_key`].

pub mod agent;
pub mod client;
pub mod notification;
pub mod office;
pub mod property;

use std::fmt;

use dreamhome_core::counter::keys;
use serde::{Deserialize, Serialize};

pub use agent::{Agent, AgentData, AgentProperty};
pub use client::{Client, ClientName, Comment, SuggestedProperty};
pub use notification::Notification;
pub use office::Office;
pub use property::{Location, Property};

/// Street address shared by clients and offices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub street: String,
    pub city: String,
    pub state: String,
}

impl Address {
    pub fn new(address: &str, street: &str, city: &str, state: &str) -> Self {
        Self {
            address: address.to_string(),
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }
    }
}

/// The document collections served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Clients,
    Agents,
    Offices,
    Properties,
    Notifications,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Clients,
        Collection::Agents,
        Collection::Offices,
        Collection::Properties,
        Collection::Notifications,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Agents => "agents",
            Self::Offices => "offices",
            Self::Properties => "properties",
            Self::Notifications => "notifications",
        }
    }

    /// Counter that issues this collection's ids
    pub fn counter_key(self) -> &'static str {
        match self {
            Self::Clients => keys::CLIENT_ID,
            Self::Agents => keys::AGENT_ID,
            Self::Offices => keys::OFFICE_ID,
            Self::Properties => keys::PROPERTY_ID,
            Self::Notifications => keys::NOTIFICATION_ID,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
