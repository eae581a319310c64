//! Async plumbing around the synchronous engine.
//!
//! - [`RuntimeGate`] initializes the foreign runtime once and lets any
//!   number of callers wait for it.
//! - [`SearchCoordinator`] fans a query out to every [`Searcher`] and keeps
//!   the newest answer per source.
//! - [`InvocationWorker`] runs invocations on the blocking pool and delivers
//!   results to a [`DisplaySink`].

mod gate;
mod search;
mod worker;

pub use gate::{InitFailure, RuntimeGate};
pub use search::{apply, CatalogSearcher, SearchCoordinator, SearchEvent, SearchSnapshot, Searcher};
pub use worker::{DisplaySink, InvocationWorker};
pub use crate::catalog::SearchConfig;
