// Talent Match: benchmark-driven ranking of employees.
// Ingestion, recalibration and ranking are pure; store and LLM access sit behind traits.

pub mod directory;
pub mod handlers;
pub mod ingest;
pub mod narrative;
pub mod pipeline;
pub mod prompts;
pub mod ranking;
pub mod recalibration;
pub mod store;
pub mod summary;

#[cfg(test)]
pub mod testing;
