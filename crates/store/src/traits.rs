//! Storage seams consumed by the analyses and the importer.

use rewards_core::types::{Benefit, BenefitClient, Event, NewEvent};
use rewards_core::RewardsResult;

/// Read side of the event log.
pub trait EventSource: Send + Sync {
    /// Every stored event, ascending by timestamp. Ties keep insertion order.
    fn list_events_ordered_by_timestamp_ascending(&self) -> RewardsResult<Vec<Event>>;
}

/// Write side of the event log, used by the importer.
pub trait EventSink: Send + Sync {
    fn insert_event(&self, event: NewEvent) -> RewardsResult<Event>;
}

/// Persistence for clients, stores and granted benefits.
pub trait BenefitSink: Send + Sync {
    /// Ensure a client row exists. Idempotent.
    fn upsert_client(&self, client_id: &str) -> RewardsResult<()>;

    /// Ensure a store row exists. Idempotent.
    fn upsert_store(&self, store_id: &str) -> RewardsResult<()>;

    /// Association of `client_id` with a benefit matching `store_id` and `description`.
    fn find_benefit_client(
        &self,
        client_id: &str,
        store_id: &str,
        description: &str,
    ) -> RewardsResult<Option<BenefitClient>>;

    fn create_benefit(&self, store_id: &str, description: &str) -> RewardsResult<Benefit>;

    /// Link a benefit to a client. Fails with `RewardsError::Conflict` when the
    /// client already holds a benefit with the same store and description.
    fn create_benefit_client(
        &self,
        client_id: &str,
        benefit_id: uuid::Uuid,
    ) -> RewardsResult<BenefitClient>;
}
