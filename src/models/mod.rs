//! Domain models for dashboard-graph.
//!
//! # Core Concepts
//!
//! - [`Record`]: An untyped row read from the system of record.
//! - [`RecordKind`] / [`EpisodeKind`]: Which collection a record came from, and
//!   which of those are materialized in the graph.
//! - [`Episode`]: The text document submitted to the graph engine.
//! - [`ExtractionResult`]: Entities and edges the engine derived from an episode.
//! - [`SearchHit`]: An opaque ranked fact returned by the engine's search.
//! - [`Answer`]: A synthesized reply with its supporting facts and [`Confidence`].
//! - [`SyncOutcome`] / [`SyncReport`] / [`BatchResult`]: Tallies of a sync pass.

mod answer;
mod episode;
mod kind;
mod outcome;
mod record;

pub use answer::*;
pub use episode::*;
pub use kind::*;
pub use outcome::*;
pub use record::*;
