//! Automatic benefits for clients with unbroken visit streaks.

pub mod engine;
pub mod streak;
pub mod writer;

pub use engine::{BenefitEngine, BenefitRunReport};
pub use streak::StreakDetector;
pub use writer::{BenefitWriter, WriteOutcome};
