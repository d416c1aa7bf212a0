//! Persists benefit grants at most once per (client, store, description).

use dashmap::DashMap;
use parking_lot::Mutex;
use rewards_core::types::{Benefit, BenefitGrant};
use rewards_core::{RewardsError, RewardsResult};
use rewards_store::BenefitSink;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(Benefit),
    /// The client already holds an equivalent benefit; nothing was written.
    AlreadyGranted,
}

impl WriteOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, WriteOutcome::Created(_))
    }
}

/// Check-then-create writer. The check and the two inserts for one triple run
/// under a lock keyed by that triple, so concurrent runs sharing a writer
/// cannot both create the association. Runs that do not share a writer rely on
/// the sink's unique constraint, surfaced as `RewardsError::Conflict`.
pub struct BenefitWriter<S: ?Sized> {
    sink: Arc<S>,
    locks: DashMap<BenefitGrant, Arc<Mutex<()>>>,
}

impl<S: BenefitSink + ?Sized> BenefitWriter<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            sink,
            locks: DashMap::new(),
        }
    }

    pub fn write(&self, grant: &BenefitGrant) -> RewardsResult<WriteOutcome> {
        let lock = self
            .locks
            .entry(grant.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        let existing = self.sink.find_benefit_client(
            &grant.client_id,
            &grant.store_id,
            &grant.description,
        )?;
        if existing.is_some() {
            debug!(
                client_id = %grant.client_id,
                store_id = %grant.store_id,
                "Benefit already granted, skipping"
            );
            return Ok(WriteOutcome::AlreadyGranted);
        }

        let benefit = self.sink.create_benefit(&grant.store_id, &grant.description)?;
        match self
            .sink
            .create_benefit_client(&grant.client_id, benefit.benefit_id)
        {
            Ok(_) => {
                debug!(
                    client_id = %grant.client_id,
                    store_id = %grant.store_id,
                    benefit_id = %benefit.benefit_id,
                    "Benefit granted"
                );
                Ok(WriteOutcome::Created(benefit))
            }
            Err(RewardsError::Conflict(reason)) => {
                warn!(
                    client_id = %grant.client_id,
                    store_id = %grant.store_id,
                    reason = %reason,
                    "Concurrent grant detected, association not created"
                );
                Ok(WriteOutcome::AlreadyGranted)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_store::MemoryStore;
    use std::thread;

    fn grant(client: &str, store: &str) -> BenefitGrant {
        BenefitGrant {
            client_id: client.to_string(),
            store_id: store.to_string(),
            description: "Automatic benefit for 5 consecutive visits without a recharge"
                .to_string(),
        }
    }

    #[test]
    fn test_same_grant_written_once() {
        let store = Arc::new(MemoryStore::new());
        let writer = BenefitWriter::new(store.clone());

        assert!(writer.write(&grant("c1", "s1")).unwrap().is_created());
        assert_eq!(
            writer.write(&grant("c1", "s1")).unwrap(),
            WriteOutcome::AlreadyGranted
        );
        assert_eq!(store.association_count(), 1);
        assert_eq!(store.benefit_count(), 1);
    }

    #[test]
    fn test_distinct_triples_each_written() {
        let store = Arc::new(MemoryStore::new());
        let writer = BenefitWriter::new(store.clone());

        writer.write(&grant("c1", "s1")).unwrap();
        writer.write(&grant("c1", "s2")).unwrap();
        writer.write(&grant("c2", "s1")).unwrap();
        assert_eq!(store.association_count(), 3);
        assert_eq!(store.benefits_for_client("c1").len(), 2);
    }

    #[test]
    fn test_concurrent_writers_share_invariant() {
        let store = Arc::new(MemoryStore::new());
        let writer = Arc::new(BenefitWriter::new(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let writer = writer.clone();
                thread::spawn(move || writer.write(&grant("c1", "s1")).unwrap())
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(WriteOutcome::is_created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(store.association_count(), 1);
    }

    #[test]
    fn test_separate_writers_fall_back_to_sink_constraint() {
        let store = Arc::new(MemoryStore::new());
        let a = BenefitWriter::new(store.clone());
        let b = BenefitWriter::new(store.clone());

        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|writer| thread::spawn(move || writer.write(&grant("c1", "s1")).unwrap()))
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(WriteOutcome::is_created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(store.association_count(), 1);
    }
}
