pub mod consolidation;
pub mod dedup;
pub mod extractor;
pub mod orchestrator;
pub mod planner;
pub mod summary;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use consolidation::{ConsolidationJob, ConsolidationReport, Consolidator};
pub use dedup::{Verdict, judge_candidate};
pub use orchestrator::{ContextPackage, RecallEngine};
pub use worker::ConsolidationPool;
