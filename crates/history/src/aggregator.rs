//! Weekly history aggregation.
//!
//! For each client the week range runs from the week of the earliest event to
//! the week of the latest one, stepping seven days at a time. Weeks without
//! activity are reported with zero values.

use chrono::{DateTime, Duration, Utc};
use rewards_core::config::WeekNumbering;
use rewards_core::partition::partition_by_client;
use rewards_core::types::{ClientHistory, Event, EventKind, HistorySeries, RechargeWeek, VisitWeek};
use rewards_core::week::week_label;
use rewards_core::RewardsResult;
use rewards_store::EventSource;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Default)]
struct RechargeTotals {
    total: f64,
    count: u64,
}

impl RechargeTotals {
    fn average(&self) -> f64 {
        if self.count > 0 {
            self.total / self.count as f64
        } else {
            0.0
        }
    }
}

pub struct HistoryAggregator {
    numbering: WeekNumbering,
}

impl HistoryAggregator {
    pub fn new(numbering: WeekNumbering) -> Self {
        Self { numbering }
    }

    pub fn numbering(&self) -> WeekNumbering {
        self.numbering
    }

    fn label(&self, ts: DateTime<Utc>) -> String {
        week_label(ts, self.numbering)
    }

    /// Week labels covering `events`, in chronological first-seen order.
    ///
    /// Labels come from stepping seven days from the earliest to the latest
    /// timestamp, merged with the labels of the events themselves. The merge
    /// matters when the last bucket is shorter than a step (the tail of a
    /// legacy year, or an ISO range starting on a Sunday); without it the
    /// events in that bucket would have no row.
    pub fn week_range(&self, events: &[Event]) -> Vec<String> {
        let mut stamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp).collect();
        stamps.sort();
        let (Some(&min), Some(&max)) = (stamps.first(), stamps.last()) else {
            return Vec::new();
        };

        let mut labels = Vec::new();
        let mut seen = HashSet::new();
        let mut step = min;
        let mut stamps = stamps.into_iter().peekable();

        loop {
            let stepping = step <= max;
            let next = match stamps.peek() {
                Some(&ts) if !stepping || ts < step => {
                    stamps.next();
                    ts
                }
                _ if stepping => {
                    let current = step;
                    step += Duration::days(7);
                    current
                }
                _ => break,
            };
            let label = self.label(next);
            if seen.insert(label.clone()) {
                labels.push(label);
            }
        }

        labels
    }

    /// History for one client. `events` should all belong to `client_id`.
    pub fn client_history(&self, client_id: &str, events: &[Event]) -> ClientHistory {
        let weeks = self.week_range(events);

        let mut visits: HashMap<String, u64> = HashMap::new();
        let mut recharges: HashMap<String, RechargeTotals> = HashMap::new();
        for event in events {
            match event.kind {
                EventKind::Visit => *visits.entry(self.label(event.timestamp)).or_default() += 1,
                EventKind::Recharge => {
                    let totals = recharges.entry(self.label(event.timestamp)).or_default();
                    totals.total += event.amount.unwrap_or(0.0);
                    totals.count += 1;
                }
                EventKind::Other(_) => {}
            }
        }

        let visit_weeks = weeks
            .iter()
            .map(|week| VisitWeek {
                week: week.clone(),
                count: visits.get(week).copied().unwrap_or(0),
            })
            .collect();
        let recharge_weeks = weeks
            .iter()
            .map(|week| RechargeWeek {
                week: week.clone(),
                average_amount: recharges.get(week).map(RechargeTotals::average).unwrap_or(0.0),
            })
            .collect();

        debug!(client_id, weeks = weeks.len(), "Client history computed");

        ClientHistory {
            client_id: client_id.to_string(),
            history: vec![
                HistorySeries::Visit { weeks: visit_weeks },
                HistorySeries::Recharge { weeks: recharge_weeks },
            ],
        }
    }

    /// Histories for every client, ordered by each client's first event.
    pub fn history(&self, events: Vec<Event>) -> Vec<ClientHistory> {
        partition_by_client(events)
            .iter()
            .map(|c| self.client_history(&c.client_id, &c.events))
            .collect()
    }

    pub fn history_from<E: EventSource + ?Sized>(&self, source: &E) -> RewardsResult<Vec<ClientHistory>> {
        let events = source.list_events_ordered_by_timestamp_ascending()?;
        metrics::counter!("history.events_scanned").increment(events.len() as u64);
        Ok(self.history(events))
    }
}
