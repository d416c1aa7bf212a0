//! Event source and benefit sink collaborators, with an in-memory backend
//! and the batch JSON importer.

pub mod import;
pub mod memory;
pub mod traits;

pub use import::{import_events, import_file, ImportSummary};
pub use memory::MemoryStore;
pub use traits::{BenefitSink, EventSink, EventSource};
