// ── Query cache ─────────────────────────────────────────────────────
//
// Keyed read-through cache over the directory API with two guarantees:
//
//   * In-flight dedup: concurrent resolves of the same key run one fetch;
//     everyone else joins it and shares the outcome.
//   * Last-request-wins: every fetch is stamped with the key's generation
//     at start. Invalidation bumps the generation, so a result that lands
//     after an invalidation is discarded instead of resurrecting stale
//     data.
//
// Errors are delivered to the callers that were waiting, never cached.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::{debug, trace};

use rolo_api::{Contact, PageRequest, PageResponse};

use crate::error::CoreError;

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// One page of the full directory listing.
    Listing(PageRequest),
    /// One page of search results for a committed query string.
    Search { query: String, page: PageRequest },
    /// A single contact by id.
    Detail(u64),
}

impl QueryKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Listing(_) => QueryKind::Listing,
            Self::Search { .. } => QueryKind::Search,
            Self::Detail(_) => QueryKind::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Listing,
    Search,
    Detail,
}

/// What a query resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Page(PageResponse<Contact>),
    Contact(Contact),
}

/// A cached value with its provenance.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: QueryValue,
    pub fetched_at: DateTime<Utc>,
    /// Set by invalidation. A stale entry is still readable through
    /// [`QueryCache::peek`] but the next resolve refetches.
    pub stale: bool,
}

/// Observable lifecycle of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched.
    Idle,
    /// A fetch is running right now.
    Loading,
    /// A value is cached (possibly stale) and the last fetch succeeded.
    Success,
    /// The last fetch failed. A stale value may still be readable
    /// through [`QueryCache::peek`].
    Error,
}

type FetchOutcome = Result<QueryValue, Arc<CoreError>>;

#[derive(Default)]
struct Slot {
    /// Bumped when a fetch begins and when the key is invalidated.
    generation: u64,
    entry: Option<CacheEntry>,
    /// Retained from the most recent failed fetch; cleared on success.
    last_error: Option<Arc<CoreError>>,
}

/// Concurrent query cache. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct QueryCache {
    slots: DashMap<QueryKey, Slot>,
    inflight: DashMap<QueryKey, watch::Receiver<Option<FetchOutcome>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fetch` to produce it.
    ///
    /// If another resolve of the same key is already fetching, this call
    /// waits for that fetch instead of issuing its own. A fetch whose key
    /// was invalidated mid-flight is discarded and retried.
    pub async fn resolve<F, Fut>(&self, key: QueryKey, fetch: F) -> FetchOutcome
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<QueryValue, CoreError>>,
    {
        loop {
            if let Some(slot) = self.slots.get(&key) {
                if let Some(ref entry) = slot.entry {
                    if !entry.stale {
                        trace!(?key, "cache hit");
                        return Ok(entry.value.clone());
                    }
                }
            }

            // Claim the fetcher role, or join the fetch already running.
            let tx = match self.inflight.entry(key.clone()) {
                Entry::Occupied(occupied) => {
                    let mut rx = occupied.get().clone();
                    drop(occupied);
                    trace!(?key, "joining in-flight fetch");
                    if self.wait_for_outcome(&mut rx).await.is_none() {
                        // Fetcher was superseded; start over.
                        continue;
                    }
                    match rx.borrow().clone() {
                        Some(outcome) => return outcome,
                        None => continue,
                    }
                }
                Entry::Vacant(vacant) => {
                    let (tx, rx) = watch::channel(None);
                    vacant.insert(rx);
                    tx
                }
            };

            let generation = {
                let mut slot = self.slots.entry(key.clone()).or_default();
                slot.generation += 1;
                slot.generation
            };
            debug!(?key, generation, "fetching");

            let result = fetch().await;

            let outcome = self.complete(&key, generation, result);
            self.inflight.remove(&key);
            match outcome {
                Some(outcome) => {
                    // Waiters pick the outcome up from the channel.
                    let _ = tx.send(Some(outcome.clone()));
                    return outcome;
                }
                None => {
                    // Superseded by an invalidation; dropping `tx` without a
                    // value sends waiters (and us) back around the loop.
                    debug!(?key, generation, "fetch superseded, retrying");
                    drop(tx);
                }
            }
        }
    }

    /// Wait until the fetcher publishes an outcome. Returns `None` if the
    /// fetcher went away without one.
    async fn wait_for_outcome(&self, rx: &mut watch::Receiver<Option<FetchOutcome>>) -> Option<()> {
        loop {
            rx.changed().await.ok()?;
            if rx.borrow().is_some() {
                return Some(());
            }
        }
    }

    /// Commit a finished fetch if its generation is still current.
    fn complete(
        &self,
        key: &QueryKey,
        generation: u64,
        result: Result<QueryValue, CoreError>,
    ) -> Option<FetchOutcome> {
        let mut slot = self.slots.entry(key.clone()).or_default();
        if slot.generation != generation {
            return None;
        }
        match result {
            Ok(value) => {
                slot.entry = Some(CacheEntry {
                    value: value.clone(),
                    fetched_at: Utc::now(),
                    stale: false,
                });
                slot.last_error = None;
                Some(Ok(value))
            }
            // The failure is retained for status inspection but never
            // served as a cached result; the next resolve refetches.
            Err(e) => {
                let e = Arc::new(e);
                slot.last_error = Some(Arc::clone(&e));
                Some(Err(e))
            }
        }
    }

    /// Read a cached entry without fetching. Stale entries are returned
    /// with their flag set so callers can render them as provisional.
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.slots.get(key).and_then(|slot| slot.entry.clone())
    }

    /// Where the query stands right now.
    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        if self.inflight.contains_key(key) {
            return QueryStatus::Loading;
        }
        match self.slots.get(key) {
            // A retained failure outranks a leftover stale value.
            Some(slot) if slot.last_error.is_some() => QueryStatus::Error,
            Some(slot) if slot.entry.is_some() => QueryStatus::Success,
            _ => QueryStatus::Idle,
        }
    }

    /// The most recent fetch failure for this key, if the last fetch
    /// failed.
    pub fn last_error(&self, key: &QueryKey) -> Option<Arc<CoreError>> {
        self.slots.get(key).and_then(|slot| slot.last_error.clone())
    }

    /// Mark every listing and search page stale. In-flight fetches for
    /// those keys are discarded when they land.
    pub fn invalidate_listings(&self) {
        self.invalidate_where(|key| {
            matches!(key.kind(), QueryKind::Listing | QueryKind::Search)
        });
    }

    /// Mark one contact's detail entry stale.
    pub fn invalidate_detail(&self, id: u64) {
        self.invalidate_where(|key| matches!(key, QueryKey::Detail(d) if *d == id));
    }

    fn invalidate_where(&self, matches: impl Fn(&QueryKey) -> bool) {
        for mut item in self.slots.iter_mut() {
            if matches(item.key()) {
                item.generation += 1;
                if let Some(ref mut entry) = item.entry {
                    entry.stale = true;
                }
            }
        }
    }

    /// Drop one entry entirely.
    pub fn evict(&self, key: &QueryKey) {
        self.slots.remove(key);
    }

    /// Drop everything. Used on logout.
    pub fn clear(&self) {
        self.slots.clear();
    }
}
