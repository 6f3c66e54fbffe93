//! Knowledge-graph sync and question answering for dashboard records.
//!
//! Records (tasks, projects, content items) are read from a relational
//! source, rendered into text episodes and submitted to a graph-extraction
//! engine. Questions are answered by searching that engine and summarizing
//! the ranked facts it returns.

pub mod answer;
pub mod api;
pub mod config;
pub mod episode;
pub mod graph;
pub mod mcp;
pub mod models;
pub mod service;
pub mod source;
pub mod sync;
