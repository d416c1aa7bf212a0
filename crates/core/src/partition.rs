//! Groups a time-ordered event log into per-client sub-sequences.

use crate::types::Event;
use std::collections::HashMap;

/// All events of one client, in the order they appeared in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvents {
    pub client_id: String,
    pub events: Vec<Event>,
}

/// Partition events by `client_id`.
///
/// Groups are returned in order of each client's first event and every
/// group keeps the relative order of its input events; nothing is re-sorted,
/// dropped, or duplicated.
pub fn partition_by_client(events: Vec<Event>) -> Vec<ClientEvents> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ClientEvents> = Vec::new();

    for event in events {
        match index.get(&event.client_id) {
            Some(&i) => groups[i].events.push(event),
            None => {
                index.insert(event.client_id.clone(), groups.len());
                groups.push(ClientEvents {
                    client_id: event.client_id.clone(),
                    events: vec![event],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventKind, NewEvent};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn event(client: &str, minutes: i64) -> Event {
        NewEvent {
            client_id: client.to_string(),
            store_id: "s1".to_string(),
            kind: EventKind::Visit,
            amount: None,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
        .into_event(Uuid::new_v4())
    }

    #[test]
    fn test_partition_preserves_order_within_client() {
        let events = vec![event("a", 0), event("b", 1), event("a", 2), event("b", 3), event("a", 4)];
        let groups = partition_by_client(events.clone());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].client_id, "a");
        assert_eq!(groups[1].client_id, "b");
        assert_eq!(
            groups[0].events,
            vec![events[0].clone(), events[2].clone(), events[4].clone()]
        );
        assert_eq!(groups[1].events, vec![events[1].clone(), events[3].clone()]);
    }

    #[test]
    fn test_partition_keeps_every_event() {
        let events: Vec<Event> = (0..50)
            .map(|i| event(&format!("c{}", i % 7), i))
            .collect();
        let groups = partition_by_client(events);
        let total: usize = groups.iter().map(|g| g.events.len()).sum();
        assert_eq!(total, 50);
        assert_eq!(groups.len(), 7);
        assert!(groups
            .iter()
            .all(|g| g.events.iter().all(|e| e.client_id == g.client_id)));
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_by_client(Vec::new()).is_empty());
    }
}
