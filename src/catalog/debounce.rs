use super::search::{CatalogSearch, search_or_empty};
use crate::models::{SearchKind, Suggestion};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct Query {
    term: String,
    kind: SearchKind,
}

/// Suggestions tagged with the term that produced them
#[derive(Debug, Clone)]
pub struct TaggedSuggestions {
    pub term: String,
    pub kind: SearchKind,
    pub suggestions: Vec<Suggestion>,
}

/// Debounced autocomplete for one input field.
///
/// Every keystroke replaces the pending lookup; the worker only searches
/// once the field has been quiet for the configured period. Results for
/// anything but the latest term are discarded on arrival.
pub struct DebouncedLookup {
    requests: Sender<Query>,
    results: Receiver<TaggedSuggestions>,
    latest: Option<Query>,
}

impl DebouncedLookup {
    pub fn spawn(catalog: Arc<dyn CatalogSearch + Send + Sync>, quiet: Duration) -> Self {
        let (requests, request_rx) = mpsc::channel();
        let (result_tx, results) = mpsc::channel();

        thread::spawn(move || run_worker(catalog, quiet, request_rx, result_tx));

        DebouncedLookup {
            requests,
            results,
            latest: None,
        }
    }

    /// Record a keystroke; the previous pending lookup is superseded
    pub fn input(&mut self, term: &str, kind: SearchKind) {
        let query = Query {
            term: term.to_string(),
            kind,
        };
        self.latest = Some(query.clone());
        // A send error means the worker is gone; later waits just time out
        let _ = self.requests.send(query);
    }

    fn is_current(&self, tagged: &TaggedSuggestions) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|q| q.term == tagged.term && q.kind == tagged.kind)
    }

    /// Suggestions for the latest term if they have already arrived
    pub fn poll(&mut self) -> Option<Vec<Suggestion>> {
        let mut current = None;
        while let Ok(tagged) = self.results.try_recv() {
            if self.is_current(&tagged) {
                current = Some(tagged.suggestions);
            } else {
                debug!(term = %tagged.term, "dropping stale suggestions");
            }
        }
        current
    }

    /// Block until suggestions for the latest term arrive or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Option<Vec<Suggestion>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.results.recv_timeout(remaining) {
                Ok(tagged) if self.is_current(&tagged) => return Some(tagged.suggestions),
                Ok(tagged) => debug!(term = %tagged.term, "dropping stale suggestions"),
                Err(_) => return None,
            }
        }
    }
}

fn run_worker(
    catalog: Arc<dyn CatalogSearch + Send + Sync>,
    quiet: Duration,
    requests: Receiver<Query>,
    results: Sender<TaggedSuggestions>,
) {
    while let Ok(mut query) = requests.recv() {
        // Keep replacing the query until the field goes quiet
        loop {
            match requests.recv_timeout(quiet) {
                Ok(newer) => query = newer,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        let suggestions = search_or_empty(catalog.as_ref(), &query.term, query.kind);
        let tagged = TaggedSuggestions {
            term: query.term,
            kind: query.kind,
            suggestions,
        };
        if results.send(tagged).is_err() {
            return;
        }
    }
}
