//! Seed batch for the sample collections
//!
//! Each record is an independent task: allocate an id from the record's
//! counter, build the document, insert it. Tasks run concurrently and every
//! outcome is collected into a [`SeedReport`]. Counter creation on first use
//! is atomic, so no task needs to wait for another.

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use dreamhome_core::{
    ConnectionManager, CounterAllocator, Document, StoreError, StoreResult, COUNTERS_COLLECTION,
};

use crate::models::{
    Address, Agent, AgentData, AgentProperty, Client, ClientName, Collection, Comment, Location,
    Notification, Office, Property, SuggestedProperty,
};

/// One seeded document
#[derive(Debug, Clone, Serialize)]
pub struct SeededRecord {
    pub collection: Collection,
    pub id: i64,
}

/// One seed task that did not complete
#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    /// `None` when the task panicked before reporting
    pub collection: Option<Collection>,
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub inserted: Vec<SeededRecord>,
    pub failures: Vec<SeedFailure>,
}

impl SeedReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.inserted
            .iter()
            .filter(|r| r.collection == collection)
            .count()
    }
}

/// Ids the seed documents use to point at each other. On a fresh store
/// these are the first ids each counter issues.
#[derive(Debug, Clone, Copy)]
struct Refs {
    first_id: i64,
}

type Builder = fn(i64, Refs) -> Result<Document, serde_json::Error>;

struct SeedTask {
    collection: Collection,
    build: Builder,
}

/// Listing data for one sample property. Every sample is in California.
struct PropertySeed {
    address: &'static str,
    street: &'static str,
    city: &'static str,
    longitude: &'static str,
    latitude: &'static str,
    sq_feet: u32,
    num_beds: u32,
    num_baths: u32,
    description: &'static str,
}

const PROPERTY_SEEDS: [PropertySeed; 3] = [
    PropertySeed {
        address: "1024",
        street: "College",
        city: "Wheaton",
        longitude: "35.601623",
        latitude: "-78.245908",
        sq_feet: 2895,
        num_beds: 4,
        num_baths: 3,
        description: "Two blocks from university",
    },
    PropertySeed {
        address: "435",
        street: "Main",
        city: "Springfield",
        longitude: "36.507623",
        latitude: "-79.145509",
        sq_feet: 3200,
        num_beds: 5,
        num_baths: 3,
        description: "Nice cottage by lake",
    },
    PropertySeed {
        address: "2240",
        street: "Berlin",
        city: "Florence",
        longitude: "31.086579",
        latitude: "-72.357987",
        sq_feet: 3950,
        num_beds: 5,
        num_baths: 5,
        description: "Mansion in the city",
    },
];

fn seed_plan() -> Vec<SeedTask> {
    vec![
        SeedTask {
            collection: Collection::Clients,
            build: |id, refs| serde_json::to_value(client(id, refs)),
        },
        SeedTask {
            collection: Collection::Agents,
            build: |id, refs| serde_json::to_value(agent(id, refs)),
        },
        SeedTask {
            collection: Collection::Notifications,
            build: |id, refs| serde_json::to_value(notification(id, refs)),
        },
        SeedTask {
            collection: Collection::Offices,
            build: |id, _| serde_json::to_value(office(id)),
        },
        SeedTask {
            collection: Collection::Properties,
            build: |id, _| serde_json::to_value(property(id, &PROPERTY_SEEDS[0])),
        },
        SeedTask {
            collection: Collection::Properties,
            build: |id, _| serde_json::to_value(property(id, &PROPERTY_SEEDS[1])),
        },
        SeedTask {
            collection: Collection::Properties,
            build: |id, _| serde_json::to_value(property(id, &PROPERTY_SEEDS[2])),
        },
    ]
}

/// Populate every sample collection.
///
/// Fails up front with `NotConnected` when the store is unreachable; once the
/// batch starts, individual failures are reported rather than returned.
pub async fn seed_database(
    manager: &ConnectionManager,
    allocator: &CounterAllocator,
) -> StoreResult<SeedReport> {
    // Confirm the store (and with it the counter table) is reachable before
    // fanning out.
    manager.ping().await?;
    info!(counters = COUNTERS_COLLECTION, "seeding sample collections");

    let refs = Refs {
        first_id: allocator.settings().start_value,
    };

    let mut tasks = JoinSet::new();
    for task in seed_plan() {
        let allocator = allocator.clone();
        let handle = manager.collection(task.collection.name());
        tasks.spawn(async move {
            let outcome = seed_one(&allocator, &handle, task.collection, task.build, refs).await;
            (task.collection, outcome)
        });
    }

    let mut report = SeedReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((collection, Ok(id))) => {
                info!(%collection, id, "seed record added");
                report.inserted.push(SeededRecord { collection, id });
            }
            Ok((collection, Err(e))) => {
                warn!(%collection, error = %e, "seed record failed");
                report.failures.push(SeedFailure {
                    collection: Some(collection),
                    error: e.kind(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "seed task aborted");
                report.failures.push(SeedFailure {
                    collection: None,
                    error: "task_aborted",
                    message: e.to_string(),
                });
            }
        }
    }

    report.inserted.sort_by_key(|r| (r.collection.name(), r.id));
    info!(
        inserted = report.inserted.len(),
        failed = report.failures.len(),
        "seed batch finished"
    );
    Ok(report)
}

async fn seed_one(
    allocator: &CounterAllocator,
    handle: &dreamhome_core::CollectionHandle,
    collection: Collection,
    build: Builder,
    refs: Refs,
) -> Result<i64, StoreError> {
    let id = allocator.next(collection.counter_key()).await?;
    let document = build(id, refs)?;
    handle.insert(document).await?;
    Ok(id)
}

fn client(id: i64, refs: Refs) -> Client {
    Client {
        client_id: id,
        client_name: ClientName {
            first: "Richard".into(),
            last: "Hendrix".into(),
        },
        client_addr: Address::new("101", "Valley Steet", "Glendale", "California"),
        agent_id: refs.first_id,
        suggested_properties: vec![SuggestedProperty {
            property_id: refs.first_id,
            property_state: 0,
            rating: 0,
            comments: vec![Comment {
                comment: "This is a beautiful home".into(),
            }],
        }],
    }
}

fn agent(id: i64, refs: Refs) -> Agent {
    Agent {
        agent_id: id,
        agent_data: AgentData {
            first: "Dinesh".into(),
            last: "Chugtai".into(),
            license: "CAL-34917".into(),
        },
        office_id: refs.first_id,
        properties: vec![AgentProperty {
            property_id: refs.first_id,
            client_id: refs.first_id,
            property_state: 0,
        }],
    }
}

fn notification(id: i64, refs: Refs) -> Notification {
    Notification {
        notification_id: id,
        agent_id: refs.first_id,
        client_id: refs.first_id,
    }
}

fn office(id: i64) -> Office {
    Office {
        office_id: id,
        office_name: "Valley North".into(),
        office_manager: "Erlich Bachman".into(),
        office_addr: Address::new("223", "Mountain Drive", "Buena Vista", "California"),
        num_properties: 0,
    }
}

fn property(id: i64, seed: &PropertySeed) -> Property {
    Property {
        property_id: id,
        location: Location {
            address: seed.address.into(),
            street: seed.street.into(),
            city: seed.city.into(),
            state: "California".into(),
            longitude: seed.longitude.into(),
            latitude: seed.latitude.into(),
        },
        sq_feet: seed.sq_feet,
        num_beds: seed.num_beds,
        num_baths: seed.num_baths,
        description: seed.description.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamhome_core::{DatabaseConfig, MemoryConnector};
    use std::sync::Arc;

    async fn connected() -> (ConnectionManager, CounterAllocator, Arc<MemoryConnector>) {
        let connector = Arc::new(MemoryConnector::new());
        let manager = ConnectionManager::new(connector.clone());
        manager
            .connect_and_wait(DatabaseConfig::with_url("memory://"))
            .await
            .unwrap();
        let allocator = CounterAllocator::new(manager.clone());
        (manager, allocator, connector)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn seeds_every_collection() {
        let (manager, allocator, connector) = connected().await;

        let report = seed_database(&manager, &allocator).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.count(Collection::Clients), 1);
        assert_eq!(report.count(Collection::Agents), 1);
        assert_eq!(report.count(Collection::Offices), 1);
        assert_eq!(report.count(Collection::Notifications), 1);
        assert_eq!(report.count(Collection::Properties), 3);

        let store = connector.store();
        assert_eq!(store.document_count("properties"), 3);
        assert_eq!(store.counter_value("propertyId"), Some(3));
        assert_eq!(store.counter_value("clientId"), Some(1));
    }

    #[tokio::test]
    async fn property_ids_are_distinct() {
        let (manager, allocator, _) = connected().await;
        let report = seed_database(&manager, &allocator).await.unwrap();

        let ids: Vec<i64> = report
            .inserted
            .iter()
            .filter(|r| r.collection == Collection::Properties)
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn property_document_uses_legacy_field_names() {
        let doc = serde_json::to_value(property(7, &PROPERTY_SEEDS[2])).unwrap();
        assert_eq!(doc["propertyId"], 7);
        assert_eq!(doc["location"]["city"], "Florence");
        assert_eq!(doc["location"]["state"], "California");
        assert_eq!(doc["sqFeet"], 3950);
        assert_eq!(doc["description"], "Mansion in the city");
    }

    #[tokio::test]
    async fn reseeding_continues_the_sequences() {
        let (manager, allocator, _) = connected().await;
        seed_database(&manager, &allocator).await.unwrap();
        let report = seed_database(&manager, &allocator).await.unwrap();

        let clients: Vec<i64> = report
            .inserted
            .iter()
            .filter(|r| r.collection == Collection::Clients)
            .map(|r| r.id)
            .collect();
        assert_eq!(clients, vec![2]);
    }

    #[tokio::test]
    async fn refuses_when_not_connected() {
        let manager = ConnectionManager::new(Arc::new(MemoryConnector::new()));
        let allocator = CounterAllocator::new(manager.clone());
        assert!(matches!(
            seed_database(&manager, &allocator).await,
            Err(StoreError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn conflicts_past_retry_budget_are_reported() {
        let (manager, _, connector) = connected().await;
        let allocator = CounterAllocator::with_settings(
            manager.clone(),
            dreamhome_core::CounterSettings {
                max_retries: 0,
                ..Default::default()
            },
        )
        .unwrap();
        connector.store().inject_conflicts(2);

        let report = seed_database(&manager, &allocator).await.unwrap();
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.inserted.len(), 5);
        assert!(report
            .failures
            .iter()
            .all(|f| f.error == "allocation_conflict"));
    }

    #[test]
    fn seed_documents_use_legacy_layout() {
        let refs = Refs { first_id: 1 };
        let doc = serde_json::to_value(agent(4, refs)).unwrap();
        assert_eq!(doc["agentId"], 4);
        assert_eq!(doc["agentData"]["agentLicense"], "CAL-34917");

        let doc = serde_json::to_value(property(9, &PROPERTY_SEEDS[2])).unwrap();
        assert_eq!(doc["location"]["city"], "Florence");
        assert_eq!(doc["sqFeet"], 3950);
    }
}
