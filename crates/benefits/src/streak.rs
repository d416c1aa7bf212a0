//! Consecutive-visit streak detection over one client's ordered events.
//!
//! A visit advances the streak, a recharge breaks it, anything else is
//! ignored. Each time the streak reaches the threshold a grant is emitted
//! for the store of the triggering visit and the streak starts over, so a
//! long unbroken run earns one grant per full block of visits.

use rewards_core::config::{BenefitsConfig, StreakScope};
use rewards_core::types::{BenefitGrant, Event, EventKind};
use std::collections::HashMap;

/// Per-client accumulator threaded through the scan.
#[derive(Debug, Clone)]
enum StreakState {
    /// Single counter shared by every store the client visits.
    Client(u32),
    /// One counter per store.
    ClientStore(HashMap<String, u32>),
}

impl StreakState {
    fn new(scope: StreakScope) -> Self {
        match scope {
            StreakScope::Client => StreakState::Client(0),
            StreakScope::ClientStore => StreakState::ClientStore(HashMap::new()),
        }
    }

    /// Count one visit and return the updated streak length.
    fn visit(&mut self, store_id: &str) -> &mut u32 {
        match self {
            StreakState::Client(count) => {
                *count += 1;
                count
            }
            StreakState::ClientStore(counts) => {
                let count = counts.entry(store_id.to_string()).or_insert(0);
                *count += 1;
                count
            }
        }
    }

    /// A recharge is made on the client's card, so it breaks every streak.
    fn reset(&mut self) {
        match self {
            StreakState::Client(count) => *count = 0,
            StreakState::ClientStore(counts) => counts.clear(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreakDetector {
    threshold: u32,
    scope: StreakScope,
    description: String,
}

impl StreakDetector {
    pub fn new(threshold: u32, scope: StreakScope, description: impl Into<String>) -> Self {
        Self {
            threshold: threshold.max(1),
            scope,
            description: description.into(),
        }
    }

    pub fn from_config(config: &BenefitsConfig) -> Self {
        Self::new(config.streak_threshold, config.streak_scope, config.description())
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn scope(&self) -> StreakScope {
        self.scope
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scan one client's events, in order, and return the grants earned.
    ///
    /// State never crosses the call boundary, so clients can be processed
    /// independently.
    pub fn detect(&self, client_id: &str, events: &[Event]) -> Vec<BenefitGrant> {
        let mut grants = Vec::new();
        let mut state = StreakState::new(self.scope);

        for event in events {
            match event.kind {
                EventKind::Visit => {
                    let streak = state.visit(&event.store_id);
                    if *streak == self.threshold {
                        *streak = 0;
                        grants.push(BenefitGrant {
                            client_id: client_id.to_string(),
                            store_id: event.store_id.clone(),
                            description: self.description.clone(),
                        });
                    }
                }
                EventKind::Recharge => state.reset(),
                EventKind::Other(_) => {}
            }
        }

        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rewards_core::types::NewEvent;
    use uuid::Uuid;

    const DESC: &str = "Automatic benefit for 5 consecutive visits without a recharge";

    fn detector(scope: StreakScope) -> StreakDetector {
        StreakDetector::new(5, scope, DESC)
    }

    /// Build events for client "c1" from (kind, store) pairs, one hour apart.
    fn events(seq: &[(&str, &str)]) -> Vec<Event> {
        let start = Utc.with_ymd_and_hms(2025, 6, 16, 9, 0, 0).unwrap();
        seq.iter()
            .enumerate()
            .map(|(i, (kind, store))| {
                NewEvent {
                    client_id: "c1".to_string(),
                    store_id: store.to_string(),
                    kind: EventKind::from(*kind),
                    amount: (*kind == "recharge").then_some(1000.0),
                    timestamp: start + Duration::hours(i as i64),
                }
                .into_event(Uuid::new_v4())
            })
            .collect()
    }

    fn visits(n: usize, store: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![("visit", store); n]
    }

    #[test]
    fn test_five_visits_grant_once() {
        let grants = detector(StreakScope::Client).detect("c1", &events(&visits(5, "s1")));
        assert_eq!(
            grants,
            vec![BenefitGrant {
                client_id: "c1".to_string(),
                store_id: "s1".to_string(),
                description: DESC.to_string(),
            }]
        );
    }

    #[test]
    fn test_streak_restarts_after_grant() {
        let d = detector(StreakScope::Client);
        assert_eq!(d.detect("c1", &events(&visits(6, "s1"))).len(), 1);
        assert_eq!(d.detect("c1", &events(&visits(9, "s1"))).len(), 1);
        assert_eq!(d.detect("c1", &events(&visits(10, "s1"))).len(), 2);
    }

    #[test]
    fn test_recharge_breaks_streak() {
        let mut seq = visits(4, "s1");
        seq.push(("recharge", "s1"));
        seq.extend(visits(4, "s1"));
        assert!(detector(StreakScope::Client).detect("c1", &events(&seq)).is_empty());
    }

    #[test]
    fn test_recharge_at_other_store_breaks_streak() {
        let mut seq = visits(4, "s1");
        seq.push(("recharge", "s2"));
        seq.push(("visit", "s1"));
        for scope in [StreakScope::Client, StreakScope::ClientStore] {
            assert!(detector(scope).detect("c1", &events(&seq)).is_empty());
        }
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let mut seq = visits(2, "s1");
        seq.push(("refund", "s1"));
        seq.extend(visits(3, "s1"));
        assert_eq!(detector(StreakScope::Client).detect("c1", &events(&seq)).len(), 1);
    }

    #[test]
    fn test_client_scope_mixes_stores() {
        let seq = vec![
            ("visit", "s1"),
            ("visit", "s2"),
            ("visit", "s1"),
            ("visit", "s2"),
            ("visit", "s3"),
        ];
        let grants = detector(StreakScope::Client).detect("c1", &events(&seq));
        assert_eq!(grants.len(), 1);
        // The triggering visit decides the store.
        assert_eq!(grants[0].store_id, "s3");
    }

    #[test]
    fn test_client_store_scope_isolates_stores() {
        let mut seq = Vec::new();
        for _ in 0..5 {
            seq.push(("visit", "s1"));
            seq.push(("visit", "s2"));
        }
        seq.push(("visit", "s3"));

        let grants = detector(StreakScope::ClientStore).detect("c1", &events(&seq));
        let stores: Vec<&str> = grants.iter().map(|g| g.store_id.as_str()).collect();
        assert_eq!(stores, vec!["s1", "s2"]);

        let interleaved = vec![
            ("visit", "s1"),
            ("visit", "s2"),
            ("visit", "s1"),
            ("visit", "s2"),
            ("visit", "s3"),
        ];
        assert!(detector(StreakScope::ClientStore)
            .detect("c1", &events(&interleaved))
            .is_empty());
    }

    #[test]
    fn test_from_config_uses_threshold() {
        let config = BenefitsConfig {
            streak_threshold: 3,
            streak_scope: StreakScope::Client,
        };
        let d = StreakDetector::from_config(&config);
        assert_eq!(d.threshold(), 3);
        assert_eq!(
            d.description(),
            "Automatic benefit for 3 consecutive visits without a recharge"
        );
        assert_eq!(d.detect("c1", &events(&visits(6, "s1"))).len(), 2);
    }
}
