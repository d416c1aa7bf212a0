//! In-process store backed by DashMap, serving as both the event source and
//! the benefit sink.

use crate::traits::{BenefitSink, EventSink, EventSource};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use rewards_core::types::{Benefit, BenefitClient, Event, NewEvent};
use rewards_core::{RewardsError, RewardsResult};
use tracing::debug;
use uuid::Uuid;

/// Unique index key for benefit associations: (client, store, description).
type AssociationKey = (String, String, String);

pub struct MemoryStore {
    /// Append-only log in insertion order.
    events: RwLock<Vec<Event>>,
    clients: DashSet<String>,
    stores: DashSet<String>,
    benefits: DashMap<Uuid, Benefit>,
    benefit_clients: DashMap<AssociationKey, BenefitClient>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            clients: DashSet::new(),
            stores: DashSet::new(),
            benefits: DashMap::new(),
            benefit_clients: DashMap::new(),
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    pub fn clients(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.clients.iter().map(|c| c.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn stores(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.stores.iter().map(|s| s.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn benefit_count(&self) -> usize {
        self.benefits.len()
    }

    pub fn association_count(&self) -> usize {
        self.benefit_clients.len()
    }

    /// Benefits associated with a client, ordered by store then description.
    pub fn benefits_for_client(&self, client_id: &str) -> Vec<Benefit> {
        let mut found: Vec<Benefit> = self
            .benefit_clients
            .iter()
            .filter(|entry| entry.key().0 == client_id)
            .filter_map(|entry| {
                self.benefits
                    .get(&entry.value().benefit_id)
                    .map(|b| b.value().clone())
            })
            .collect();
        found.sort_by(|a, b| {
            (a.store_id.as_str(), a.description.as_str())
                .cmp(&(b.store_id.as_str(), b.description.as_str()))
        });
        found
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for MemoryStore {
    fn list_events_ordered_by_timestamp_ascending(&self) -> RewardsResult<Vec<Event>> {
        let mut events = self.events.read().clone();
        // Stable sort: equal timestamps stay in insertion order.
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

impl EventSink for MemoryStore {
    fn insert_event(&self, event: NewEvent) -> RewardsResult<Event> {
        let event = event.into_event(Uuid::new_v4());
        self.events.write().push(event.clone());
        Ok(event)
    }
}

impl BenefitSink for MemoryStore {
    fn upsert_client(&self, client_id: &str) -> RewardsResult<()> {
        self.clients.insert(client_id.to_string());
        Ok(())
    }

    fn upsert_store(&self, store_id: &str) -> RewardsResult<()> {
        self.stores.insert(store_id.to_string());
        Ok(())
    }

    fn find_benefit_client(
        &self,
        client_id: &str,
        store_id: &str,
        description: &str,
    ) -> RewardsResult<Option<BenefitClient>> {
        let key = (
            client_id.to_string(),
            store_id.to_string(),
            description.to_string(),
        );
        Ok(self.benefit_clients.get(&key).map(|bc| bc.value().clone()))
    }

    fn create_benefit(&self, store_id: &str, description: &str) -> RewardsResult<Benefit> {
        let benefit = Benefit {
            benefit_id: Uuid::new_v4(),
            store_id: store_id.to_string(),
            description: description.to_string(),
        };
        self.benefits.insert(benefit.benefit_id, benefit.clone());
        debug!(benefit_id = %benefit.benefit_id, store_id, "Benefit created");
        Ok(benefit)
    }

    fn create_benefit_client(
        &self,
        client_id: &str,
        benefit_id: Uuid,
    ) -> RewardsResult<BenefitClient> {
        let (store_id, description) = {
            let benefit = self
                .benefits
                .get(&benefit_id)
                .ok_or_else(|| RewardsError::NotFound(format!("benefit {}", benefit_id)))?;
            (benefit.store_id.clone(), benefit.description.clone())
        };

        let key = (client_id.to_string(), store_id, description);
        match self.benefit_clients.entry(key) {
            Entry::Occupied(existing) => Err(RewardsError::Conflict(format!(
                "client {} already holds benefit {} at store {}",
                client_id,
                existing.get().benefit_id,
                existing.key().1
            ))),
            Entry::Vacant(slot) => {
                let association = BenefitClient {
                    client_id: client_id.to_string(),
                    benefit_id,
                };
                slot.insert(association.clone());
                Ok(association)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rewards_core::types::EventKind;

    fn new_event(client: &str, offset_secs: i64) -> NewEvent {
        NewEvent {
            client_id: client.to_string(),
            store_id: "s1".to_string(),
            kind: EventKind::Visit,
            amount: None,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_events_listed_by_timestamp_then_insertion() {
        let store = MemoryStore::new();
        let late = store.insert_event(new_event("a", 100)).unwrap();
        let tie_first = store.insert_event(new_event("b", 0)).unwrap();
        let tie_second = store.insert_event(new_event("c", 0)).unwrap();

        let listed = store.list_events_ordered_by_timestamp_ascending().unwrap();
        assert_eq!(listed, vec![tie_first, tie_second, late]);
        assert_eq!(store.event_count(), 3);
    }

    #[test]
    fn test_upserts_are_idempotent() {
        let store = MemoryStore::new();
        store.upsert_client("c1").unwrap();
        store.upsert_client("c1").unwrap();
        store.upsert_store("s1").unwrap();
        store.upsert_store("s1").unwrap();
        assert_eq!(store.clients(), vec!["c1".to_string()]);
        assert_eq!(store.stores(), vec!["s1".to_string()]);
    }

    #[test]
    fn test_association_is_unique_per_triple() {
        let store = MemoryStore::new();
        let first = store.create_benefit("s1", "promo").unwrap();
        store.create_benefit_client("c1", first.benefit_id).unwrap();

        let second = store.create_benefit("s1", "promo").unwrap();
        let err = store.create_benefit_client("c1", second.benefit_id).unwrap_err();
        assert!(matches!(err, RewardsError::Conflict(_)));

        // A different client may hold an equivalent benefit.
        store.create_benefit_client("c2", second.benefit_id).unwrap();
        assert_eq!(store.association_count(), 2);

        let found = store.find_benefit_client("c1", "s1", "promo").unwrap();
        assert_eq!(found.map(|bc| bc.benefit_id), Some(first.benefit_id));
        assert!(store.find_benefit_client("c1", "s2", "promo").unwrap().is_none());
        assert_eq!(store.benefits_for_client("c1"), vec![first]);
    }

    #[test]
    fn test_association_requires_existing_benefit() {
        let store = MemoryStore::new();
        let err = store.create_benefit_client("c1", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, RewardsError::NotFound(_)));
    }
}
