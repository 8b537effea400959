use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use dreamhome_core::{
    ConnectionManager, CounterAllocator, DatabaseConfig, MemoryConnector, StoreError,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Next(usize),
    Peek(usize),
}

const KEYS: [&str; 3] = ["clientId", "agentId", "propertyId"];

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..KEYS.len()).prop_map(Op::Next),
        (0..KEYS.len()).prop_map(Op::Peek),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

async fn connected_allocator() -> CounterAllocator {
    let manager = ConnectionManager::new(Arc::new(MemoryConnector::new()));
    manager
        .connect_and_wait(DatabaseConfig::with_url("memory://"))
        .await
        .unwrap();
    CounterAllocator::new(manager)
}

proptest! {
    /// Property: allocations follow a per-key +1 model and peeks never move it
    #[test]
    fn prop_sequential_ops_match_model(ops in prop::collection::vec(arb_op(), 1..60)) {
        let rt = runtime();
        let outcome: Result<(), TestCaseError> = rt.block_on(async {
            let alloc = connected_allocator().await;
            let mut model: HashMap<&str, i64> = HashMap::new();

            for op in ops {
                match op {
                    Op::Next(k) => {
                        let key = KEYS[k];
                        let expected = model.get(key).map_or(1, |v| v + 1);
                        prop_assert_eq!(alloc.next(key).await.unwrap(), expected);
                        model.insert(key, expected);
                    }
                    Op::Peek(k) => {
                        let key = KEYS[k];
                        match (alloc.peek(key).await, model.get(key)) {
                            (Ok(value), Some(expected)) => prop_assert_eq!(value, *expected),
                            (Err(StoreError::NotFound { .. }), None) => {}
                            (other, expected) => {
                                return Err(TestCaseError::fail(format!(
                                    "peek {} returned {:?}, model has {:?}",
                                    key, other, expected
                                )));
                            }
                        }
                    }
                }
            }
            Ok(())
        });
        outcome?;
    }

    /// Property: a concurrent burst of N yields exactly {v+1, ..., v+N}
    #[test]
    fn prop_concurrent_burst_is_gapless(prior in 0usize..10, burst in 1usize..40) {
        let rt = runtime();
        let (issued, expected) = rt.block_on(async {
            let alloc = connected_allocator().await;
            for _ in 0..prior {
                alloc.next("agentId").await.unwrap();
            }

            let handles: Vec<_> = (0..burst)
                .map(|_| {
                    let alloc = alloc.clone();
                    tokio::spawn(async move { alloc.next("agentId").await.unwrap() })
                })
                .collect();

            let mut issued = Vec::with_capacity(burst);
            for handle in handles {
                issued.push(handle.await.unwrap());
            }

            let v = prior as i64;
            let expected: BTreeSet<i64> = (v + 1..=v + burst as i64).collect();
            (issued, expected)
        });

        let unique: BTreeSet<i64> = issued.iter().copied().collect();
        prop_assert_eq!(unique.len(), issued.len());
        prop_assert_eq!(unique, expected);
    }
}
