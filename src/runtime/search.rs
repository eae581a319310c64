//! Background command search.

use crate::catalog::{CatalogError, CommandCatalog, CommandDescriptor, SearchConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One place commands can be searched in.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Source name; results are kept per source.
    fn name(&self) -> &str;

    /// Commands matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<Arc<CommandDescriptor>>, CatalogError>;
}

/// Searches an in-memory catalog.
pub struct CatalogSearcher {
    name: String,
    catalog: Arc<RwLock<dyn CommandCatalog + Send + Sync>>,
}

impl CatalogSearcher {
    /// Search `catalog` under the source name `name`.
    pub fn new(name: impl Into<String>, catalog: Arc<RwLock<dyn CommandCatalog + Send + Sync>>) -> Self {
        Self {
            name: name.into(),
            catalog,
        }
    }
}

#[async_trait]
impl Searcher for CatalogSearcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<Arc<CommandDescriptor>>, CatalogError> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| CatalogError::discovery(&self.name, "catalog lock poisoned"))?;
        Ok(catalog.search(query))
    }
}

/// A completed search, as delivered by a searcher task.
#[derive(Debug, Clone)]
pub struct SearchEvent {
    /// Source that answered.
    pub source: String,
    /// Dispatch generation the answer belongs to.
    pub generation: u64,
    /// The query that was searched.
    pub query: String,
    /// Matches, or the failure message.
    pub outcome: Result<Vec<Arc<CommandDescriptor>>, String>,
}

/// The current results of one source.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    /// Dispatch generation these results belong to.
    pub generation: u64,
    /// The query.
    pub query: String,
    /// Matches, best first.
    pub results: Vec<Arc<CommandDescriptor>>,
    /// Set when the source failed.
    pub error: Option<String>,
}

/// Apply `event` to the per-source results, keeping at most `limit`
/// matches. An event older than the source's current results is ignored.
///
/// Returns whether anything changed.
pub fn apply(
    current: &mut HashMap<String, SearchSnapshot>,
    event: SearchEvent,
    limit: usize,
) -> bool {
    if let Some(existing) = current.get(&event.source) {
        if existing.generation > event.generation {
            tracing::debug!(
                source = %event.source,
                stale = event.generation,
                current = existing.generation,
                "ignoring stale search results"
            );
            return false;
        }
    }

    let (mut results, error) = match event.outcome {
        Ok(results) => (results, None),
        Err(message) => (Vec::new(), Some(message)),
    };
    results.truncate(limit);
    tracing::debug!(
        source = %event.source,
        generation = event.generation,
        results = results.len(),
        "applied search results"
    );
    current.insert(
        event.source,
        SearchSnapshot {
            generation: event.generation,
            query: event.query,
            results,
            error,
        },
    );
    true
}

type Snapshots = Arc<RwLock<HashMap<String, SearchSnapshot>>>;

/// Dispatches queries to every searcher in the background and keeps the
/// latest answer of each.
///
/// Must be created inside a tokio runtime.
pub struct SearchCoordinator {
    searchers: Vec<Arc<dyn Searcher>>,
    generation: AtomicU64,
    events: mpsc::UnboundedSender<SearchEvent>,
    snapshots: Snapshots,
    revision: watch::Receiver<u64>,
    shutdown: CancellationToken,
    collector: Option<JoinHandle<()>>,
}

impl SearchCoordinator {
    /// Start the collector for `searchers`.
    pub fn new(searchers: Vec<Arc<dyn Searcher>>, config: &SearchConfig) -> Self {
        let (events, mut inbox) = mpsc::unbounded_channel::<SearchEvent>();
        let (publish, revision) = watch::channel(0u64);
        let snapshots: Snapshots = Arc::new(RwLock::new(HashMap::new()));
        let shutdown = CancellationToken::new();
        let limit = config.max_results_per_source;

        let collector = {
            let snapshots = Arc::clone(&snapshots);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    let event = tokio::select! {
                        _ = shutdown.cancelled() => break,
                        event = inbox.recv() => match event {
                            Some(event) => event,
                            None => break,
                        },
                    };
                    let changed = {
                        let mut current = snapshots
                            .write()
                            .unwrap_or_else(|poisoned| poisoned.into_inner());
                        apply(&mut current, event, limit)
                    };
                    if changed {
                        publish.send_modify(|r| *r += 1);
                    }
                }
                tracing::debug!("search collector stopped");
            })
        };

        Self {
            searchers,
            generation: AtomicU64::new(0),
            events,
            snapshots,
            revision,
            shutdown,
            collector: Some(collector),
        }
    }

    /// Search every source for `query`. Returns the dispatch generation.
    pub fn search(&self, query: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if self.shutdown.is_cancelled() {
            return generation;
        }
        tracing::debug!(query, generation, "dispatching search");

        for searcher in &self.searchers {
            let searcher = Arc::clone(searcher);
            let events = self.events.clone();
            let shutdown = self.shutdown.clone();
            let query = query.to_string();
            tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = shutdown.cancelled() => return,
                    outcome = searcher.search(&query) => outcome,
                };
                let event = SearchEvent {
                    source: searcher.name().to_string(),
                    generation,
                    query,
                    outcome: outcome.map_err(|e| e.to_string()),
                };
                // the collector is gone after shutdown
                let _ = events.send(event);
            });
        }
        generation
    }

    /// The latest results of `source`.
    pub fn snapshot(&self, source: &str) -> Option<SearchSnapshot> {
        self.read().get(source).cloned()
    }

    /// The latest results of every source that answered, by source name.
    pub fn snapshots(&self) -> Vec<(String, SearchSnapshot)> {
        let mut all: Vec<_> = self
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, SearchSnapshot>> {
        self.snapshots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A receiver notified whenever results change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    /// Stop the collector and every in-flight search.
    pub fn shutdown(&self) {
        tracing::debug!("shutting down search");
        self.shutdown.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Shut down and wait for the collector to exit.
    pub async fn join(mut self) {
        self.shutdown.cancel();
        if let Some(collector) = self.collector.take() {
            let _ = collector.await;
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.searchers.iter().map(|s| s.name()).collect();
        f.debug_struct("SearchCoordinator")
            .field("sources", &sources)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DefaultCommandCatalog;

    fn cmd(identifier: &str) -> Arc<CommandDescriptor> {
        Arc::new(CommandDescriptor::new(identifier, identifier))
    }

    fn event(source: &str, generation: u64, ids: &[&str]) -> SearchEvent {
        SearchEvent {
            source: source.to_string(),
            generation,
            query: format!("q{}", generation),
            outcome: Ok(ids.iter().map(|id| cmd(id)).collect()),
        }
    }

    #[test]
    fn test_apply_last_writer_wins_per_source() {
        let mut current = HashMap::new();
        assert!(apply(&mut current, event("a", 2, &["new"]), 10));
        assert!(!apply(&mut current, event("a", 1, &["old"]), 10));
        assert_eq!(current["a"].results[0].identifier, "new");

        // another source is independent
        assert!(apply(&mut current, event("b", 1, &["other"]), 10));
        assert_eq!(current.len(), 2);

        assert!(apply(&mut current, event("a", 3, &[]), 10));
        assert!(current["a"].results.is_empty());
        assert_eq!(current["a"].query, "q3");
    }

    #[test]
    fn test_apply_truncates_and_records_errors() {
        let mut current = HashMap::new();
        apply(&mut current, event("a", 1, &["x", "y", "z"]), 2);
        assert_eq!(current["a"].results.len(), 2);

        let failed = SearchEvent {
            outcome: Err("index unavailable".to_string()),
            ..event("a", 2, &[])
        };
        apply(&mut current, failed, 2);
        assert_eq!(current["a"].error.as_deref(), Some("index unavailable"));
        assert!(current["a"].results.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_searcher() {
        let catalog: DefaultCommandCatalog = vec![
            CommandDescriptor::new("filter.gauss", "Gaussian Blur"),
            CommandDescriptor::new("filter.median", "Median"),
        ]
        .into_iter()
        .collect();
        let searcher = CatalogSearcher::new("catalog", Arc::new(RwLock::new(catalog)));

        assert_eq!(searcher.search("GAUSS").await.unwrap().len(), 1);
        assert_eq!(searcher.search("filter").await.unwrap().len(), 2);
        assert!(searcher.search("").await.unwrap().is_empty());
        assert!(searcher.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_stops_collector() {
        let coordinator = SearchCoordinator::new(Vec::new(), &SearchConfig::default());
        let mut revisions = coordinator.subscribe();

        coordinator.join().await;
        // the collector owned the publishing side
        assert!(revisions.changed().await.is_err());
    }
}
