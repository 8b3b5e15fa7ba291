//! Live search session
//!
//! Owns one copy of the index, the current query and its ranked results.
//! The index is loaded once in the background; until it arrives every
//! query yields no results. Loading again only happens on `reload`.
//!
//! Dropping a session aborts an in-flight load so nothing is installed
//! after the owner is gone.

use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::indexer::{load_index, ArticleSource, Catalog, IndexStats, SearchDocument};
use crate::ranker::{FuzzyRanker, MatchResult};

type Built = (Vec<SearchDocument>, IndexStats);

struct Loader {
    catalog: Arc<Catalog>,
    source: Arc<dyn ArticleSource>,
}

struct Pending {
    rx: oneshot::Receiver<Built>,
    task: JoinHandle<()>,
}

pub struct SearchSession {
    ranker: FuzzyRanker,
    query: String,
    results: Vec<MatchResult>,
    index: Option<Arc<Vec<SearchDocument>>>,
    stats: Option<IndexStats>,
    loader: Option<Loader>,
    pending: Option<Pending>,
}

impl SearchSession {
    /// Start loading the index in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(catalog: Catalog, source: Arc<dyn ArticleSource>, ranker: FuzzyRanker) -> Self {
        let mut session = Self {
            ranker,
            query: String::new(),
            results: Vec::new(),
            index: None,
            stats: None,
            loader: Some(Loader {
                catalog: Arc::new(catalog),
                source,
            }),
            pending: None,
        };
        session.start_load();
        session
    }

    /// A session over an already built index
    pub fn from_index(index: Vec<SearchDocument>, ranker: FuzzyRanker) -> Self {
        Self {
            ranker,
            query: String::new(),
            results: Vec::new(),
            index: Some(Arc::new(index)),
            stats: None,
            loader: None,
            pending: None,
        }
    }

    fn start_load(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        if let Some(old) = self.pending.take() {
            old.task.abort();
        }

        let (tx, rx) = oneshot::channel();
        let catalog = Arc::clone(&loader.catalog);
        let source = Arc::clone(&loader.source);

        let task = tokio::spawn(async move {
            let built = load_index(&catalog, source.as_ref()).await;
            // The receiver is gone when the session was dropped
            let _ = tx.send(built);
        });

        self.pending = Some(Pending { rx, task });
    }

    /// Wait for a pending load and install its index
    pub async fn ready(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending.rx.await {
            Ok((index, stats)) => self.install(index, stats),
            Err(_) => tracing::warn!("Search index load was interrupted"),
        }
    }

    /// Install the index if the background load has finished
    ///
    /// Returns true when a new index was installed.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        match pending.rx.try_recv() {
            Ok((index, stats)) => {
                self.pending = None;
                self.install(index, stats);
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                tracing::warn!("Search index load was interrupted");
                false
            }
        }
    }

    /// Fetch the articles again and rebuild the index
    ///
    /// The previous index keeps serving queries until the new one lands.
    pub fn reload(&mut self) {
        self.start_load();
    }

    fn install(&mut self, index: Vec<SearchDocument>, stats: IndexStats) {
        self.index = Some(Arc::new(index));
        self.stats = Some(stats);
        self.rerun();
    }

    fn rerun(&mut self) {
        self.results = match &self.index {
            Some(index) => self.ranker.search(&self.query, index),
            None => Vec::new(),
        };
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.rerun();
    }

    pub fn clear(&mut self) {
        self.set_query(String::new());
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// The installed index, empty while the first load is pending
    pub fn index(&self) -> &[SearchDocument] {
        match &self.index {
            Some(index) => index.as_slice(),
            None => &[],
        }
    }

    pub fn stats(&self) -> Option<IndexStats> {
        self.stats
    }

    pub fn ranker(&self) -> &FuzzyRanker {
        &self.ranker
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}
