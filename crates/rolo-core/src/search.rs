// ── Debounced search ────────────────────────────────────────────────
//
// Raw keystrokes update the visible input immediately; the query only
// commits (and hits the network) after a quiet period with no further
// typing. Committing a different query resets pagination to page zero.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use rolo_api::{PageRequest, SortDir};

use crate::cache::QueryKey;
use crate::config::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE};

/// Supersede-on-signal quiet timer.
///
/// Each [`settle`](Self::settle) call starts a quiet period and cancels
/// every earlier one still waiting. Only the most recent caller comes
/// back `true`.
pub struct Debouncer {
    quiet: Duration,
    seq: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            seq: AtomicU64::new(0),
        }
    }

    /// Wait out the quiet period. Returns `false` if another `settle`
    /// started in the meantime.
    pub async fn settle(&self) -> bool {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

/// Which dataset the active view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// No committed query; the full directory listing.
    Browse,
    /// A committed non-empty query; server-side search results.
    Search,
}

/// View parameters for the contact list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Raw text as typed, updated on every keystroke.
    pub input: String,
    /// The query in effect. Empty means browse mode.
    pub committed: String,
    pub page: u32,
    pub size: u32,
    pub sort_by: Option<String>,
    pub sort_dir: SortDir,
}

impl SearchState {
    pub fn mode(&self) -> SearchMode {
        if self.committed.is_empty() {
            SearchMode::Browse
        } else {
            SearchMode::Search
        }
    }
}

/// Owns the list view's query/page/sort state and the debounce timer.
pub struct SearchController {
    state: watch::Sender<SearchState>,
    debouncer: Debouncer,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_DEBOUNCE)
    }
}

impl SearchController {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState {
            input: String::new(),
            committed: String::new(),
            page: 0,
            size: page_size,
            sort_by: None,
            sort_dir: SortDir::Asc,
        });
        Self {
            state,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Record a keystroke and wait out the quiet period.
    ///
    /// The raw input is visible immediately; the query commits only if no
    /// later keystroke supersedes this one. Returns whether it committed.
    pub async fn type_input(&self, text: &str) -> bool {
        self.state.send_modify(|s| s.input = text.to_owned());
        if !self.debouncer.settle().await {
            return false;
        }
        self.commit(text);
        true
    }

    /// Commit a query immediately, bypassing the debounce. Used for
    /// explicit submission (pressing enter, a one-shot CLI search).
    pub fn commit(&self, text: &str) {
        let query = text.trim();
        self.state.send_modify(|s| {
            s.input = text.to_owned();
            if s.committed != query {
                debug!(query, "search query committed");
                s.committed = query.to_owned();
                s.page = 0;
            }
        });
    }

    /// Jump to a page within the current result set.
    pub fn set_page(&self, page: u32) {
        self.state.send_modify(|s| s.page = page);
    }

    /// Change the page size. The view returns to the first page since the
    /// old page number no longer addresses the same rows.
    pub fn set_size(&self, size: u32) {
        self.state.send_modify(|s| {
            if s.size != size {
                s.size = size;
                s.page = 0;
            }
        });
    }

    pub fn set_sort(&self, sort_by: Option<String>, sort_dir: SortDir) {
        self.state.send_modify(|s| {
            if s.sort_by != sort_by || s.sort_dir != sort_dir {
                s.sort_by = sort_by;
                s.sort_dir = sort_dir;
                s.page = 0;
            }
        });
    }

    /// Clear the query and return to browsing from the first page.
    pub fn clear(&self) {
        self.state.send_modify(|s| {
            s.input.clear();
            s.committed.clear();
            s.page = 0;
        });
    }

    /// The cache key for what the view should be showing right now.
    pub fn active_key(&self) -> QueryKey {
        let s = self.state.borrow();
        let page = PageRequest {
            page: s.page,
            size: s.size,
            sort_by: s.sort_by.clone(),
            sort_dir: s.sort_dir,
        };
        if s.committed.is_empty() {
            QueryKey::Listing(page)
        } else {
            QueryKey::Search {
                query: s.committed.clone(),
                page,
            }
        }
    }
}
