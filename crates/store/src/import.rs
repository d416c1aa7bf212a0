//! Batch import of a JSON event export into the store.
//!
//! The input is a JSON array of `{client_id, store_id, type, amount?, timestamp}`
//! records. Incomplete records are skipped and only counted; a timestamp that
//! cannot be parsed aborts the whole run. Records inserted before the failure
//! stay inserted. Re-importing the same file duplicates its events.

use crate::traits::{BenefitSink, EventSink};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rewards_core::types::{EventKind, NewEvent};
use rewards_core::{RewardsError, RewardsResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};
use utoipa::ToSchema;

/// One record as found in the export file.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RawEvent {
    pub client_id: Option<String>,
    pub store_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<String>,
}

impl RawEvent {
    /// Required fields, or `None` when any of them is absent or empty.
    fn required(&self) -> Option<(&str, &str, &str, &str)> {
        Some((
            present(&self.client_id)?,
            present(&self.store_id)?,
            present(&self.kind)?,
            present(&self.timestamp)?,
        ))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse an export timestamp. Offsets are honored; naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Import already-decoded records.
pub fn import_records<S>(records: Vec<RawEvent>, sink: &S) -> RewardsResult<ImportSummary>
where
    S: EventSink + BenefitSink + ?Sized,
{
    let mut summary = ImportSummary::default();

    for (index, record) in records.iter().enumerate() {
        let Some((client_id, store_id, kind, raw_ts)) = record.required() else {
            summary.skipped += 1;
            continue;
        };

        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| RewardsError::Import {
            index,
            message: format!("invalid timestamp {:?}", raw_ts),
        })?;

        sink.upsert_client(client_id)?;
        sink.upsert_store(store_id)?;

        let kind = EventKind::from(kind);
        let amount = if kind == EventKind::Recharge {
            record.amount
        } else {
            None
        };

        sink.insert_event(NewEvent {
            client_id: client_id.to_string(),
            store_id: store_id.to_string(),
            kind,
            amount,
            timestamp,
        })?;
        summary.imported += 1;
    }

    metrics::counter!("import.records_imported").increment(summary.imported as u64);
    metrics::counter!("import.records_skipped").increment(summary.skipped as u64);

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "Incomplete event records skipped");
    }
    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "Event import finished"
    );

    Ok(summary)
}

/// Import a JSON array of events from any reader.
pub fn import_events<R, S>(reader: R, sink: &S) -> RewardsResult<ImportSummary>
where
    R: Read,
    S: EventSink + BenefitSink + ?Sized,
{
    let records: Vec<RawEvent> = serde_json::from_reader(reader)?;
    import_records(records, sink)
}

/// Import a JSON event export from disk.
pub fn import_file<S>(path: impl AsRef<Path>, sink: &S) -> RewardsResult<ImportSummary>
where
    S: EventSink + BenefitSink + ?Sized,
{
    let path = path.as_ref();
    info!(path = %path.display(), "Importing events");
    let file = File::open(path)?;
    import_events(BufReader::new(file), sink)
}
