//! Domain types shared by the benefit engine, the weekly history, and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Events ─────────────────────────────────────────────────────────────────

/// Kind of a store event. Values other than `visit` and `recharge` are
/// kept verbatim and ignored by both analyses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Visit,
    Recharge,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Visit => "visit",
            EventKind::Recharge => "recharge",
            EventKind::Other(s) => s,
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "visit" => EventKind::Visit,
            "recharge" => EventKind::Recharge,
            _ => EventKind::Other(value),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        EventKind::from(value.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A stored, immutable customer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub client_id: String,
    pub store_id: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "visit")]
    pub kind: EventKind,
    /// Present only for recharges.
    pub amount: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn is_visit(&self) -> bool {
        self.kind == EventKind::Visit
    }

    pub fn is_recharge(&self) -> bool {
        self.kind == EventKind::Recharge
    }
}

/// Event payload before the store assigns it an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub client_id: String,
    pub store_id: String,
    pub kind: EventKind,
    pub amount: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl NewEvent {
    pub fn into_event(self, event_id: Uuid) -> Event {
        Event {
            event_id,
            client_id: self.client_id,
            store_id: self.store_id,
            kind: self.kind,
            amount: self.amount,
            timestamp: self.timestamp,
        }
    }
}

// ─── Benefits ───────────────────────────────────────────────────────────────

/// A detected, not yet deduplicated, benefit award.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenefitGrant {
    pub client_id: String,
    pub store_id: String,
    pub description: String,
}

/// Persisted benefit definition scoped to one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Benefit {
    pub benefit_id: Uuid,
    pub store_id: String,
    pub description: String,
}

/// Association between a client and a benefit they earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BenefitClient {
    pub client_id: String,
    pub benefit_id: Uuid,
}

// ─── Weekly History ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisitWeek {
    pub week: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RechargeWeek {
    pub week: String,
    pub average_amount: f64,
}

/// One typed series of weekly buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistorySeries {
    Visit { weeks: Vec<VisitWeek> },
    Recharge { weeks: Vec<RechargeWeek> },
}

/// Weekly transaction history for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientHistory {
    pub client_id: String,
    pub history: Vec<HistorySeries>,
}

impl ClientHistory {
    pub fn visit_weeks(&self) -> &[VisitWeek] {
        self.history
            .iter()
            .find_map(|s| match s {
                HistorySeries::Visit { weeks } => Some(weeks.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn recharge_weeks(&self) -> &[RechargeWeek] {
        self.history
            .iter()
            .find_map(|s| match s {
                HistorySeries::Recharge { weeks } => Some(weeks.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}
