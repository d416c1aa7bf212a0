//! Per-client weekly transaction history: visit counts and average recharge
//! amounts bucketed by week.

pub mod aggregator;

pub use aggregator::HistoryAggregator;
