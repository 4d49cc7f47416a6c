//! Keyed query cache with page-merge support.
//!
//! `QueryCache` is the layer between views and the network client. Each
//! endpoint gets its own cache instance configured with a key function (which
//! arguments participate in entry identity), a merge mode, and a fetcher.
//!
//! For the paginated breed list the key deliberately excludes the page number,
//! so successive pages accumulate into one growing entry. For search the key
//! is the full query text, so each term gets its own entry.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::debug;

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, String>> + Send>>;
type FetcherFn<A, T> = Box<dyn Fn(A) -> BoxFuture<T> + Send + Sync>;
type KeyFn<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

/// How a fetch result is applied to an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
  /// Result replaces the entry's data (search, one-shot lists).
  Replace,
  /// Result is appended to the entry's data (page accumulation).
  Append,
}

/// Lifecycle status of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
  /// Created but no fetch dispatched yet.
  Uninitialized,
  /// First fetch in flight, nothing applied yet.
  Loading,
  /// At least one fetch applied successfully.
  Loaded,
  /// Most recent applied fetch failed; prior data is retained.
  Error(String),
}

/// One cached query result sequence and its bookkeeping.
///
/// Entries are mutated only by the owning `QueryCache`; views observe them
/// through the accessors.
pub struct CacheEntry<A, T> {
  data: Vec<T>,
  status: EntryStatus,
  last_args: Option<A>,
  subscribers: usize,
  /// Bumped once per applied completion; lets observers detect change.
  version: u64,
  /// Item count of the most recently applied successful fetch.
  last_batch_len: Option<usize>,

  // Completion sequencing. Fetches are numbered at dispatch; results are
  // buffered and applied strictly in dispatch order, so a slow page-2
  // response can never land after a fast page-3.
  next_seq: u64,
  applied_seq: u64,
  pending: BTreeMap<u64, Result<Vec<T>, String>>,
  in_flight: Vec<(u64, A)>,
  tx: mpsc::UnboundedSender<(u64, Result<Vec<T>, String>)>,
  rx: mpsc::UnboundedReceiver<(u64, Result<Vec<T>, String>)>,
}

impl<A, T> CacheEntry<A, T> {
  fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      data: Vec::new(),
      status: EntryStatus::Uninitialized,
      last_args: None,
      subscribers: 0,
      version: 0,
      last_batch_len: None,
      next_seq: 0,
      applied_seq: 0,
      pending: BTreeMap::new(),
      in_flight: Vec::new(),
      tx,
      rx,
    }
  }

  /// Accumulated data, in first-fetched-first-appended order.
  pub fn data(&self) -> &[T] {
    &self.data
  }

  pub fn status(&self) -> &EntryStatus {
    &self.status
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.status, EntryStatus::Loading)
  }

  pub fn error(&self) -> Option<&str> {
    match &self.status {
      EntryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// True while any fetch for this entry is in flight.
  pub fn is_fetching(&self) -> bool {
    !self.in_flight.is_empty()
  }

  /// Change counter; increments once per applied completion.
  pub fn version(&self) -> u64 {
    self.version
  }

  /// Length of the most recently applied successful batch.
  pub fn last_batch_len(&self) -> Option<usize> {
    self.last_batch_len
  }

  pub fn last_args(&self) -> Option<&A> {
    self.last_args.as_ref()
  }

  pub fn subscribers(&self) -> usize {
    self.subscribers
  }
}

/// Keyed cache of query results for one endpoint.
pub struct QueryCache<A, T> {
  name: &'static str,
  key_of: KeyFn<A>,
  merge: MergeMode,
  fetcher: FetcherFn<A, T>,
  entries: HashMap<String, CacheEntry<A, T>>,
}

impl<A, T> QueryCache<A, T>
where
  A: Clone + PartialEq + Send + 'static,
  T: Send + 'static,
{
  pub fn new<K, F, Fut>(name: &'static str, merge: MergeMode, key_of: K, fetcher: F) -> Self
  where
    K: Fn(&A) -> String + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, String>> + Send + 'static,
  {
    Self {
      name,
      key_of: Box::new(key_of),
      merge,
      fetcher: Box::new(move |args| Box::pin(fetcher(args))),
      entries: HashMap::new(),
    }
  }

  /// Decide whether `args` require a network fetch.
  ///
  /// True exactly when no entry exists for the derived key, or the entry's
  /// last requested arguments differ from `args` (page/limit change for the
  /// paginated list, text change for search).
  pub fn should_refetch(&self, args: &A) -> bool {
    match self.entries.get(&(self.key_of)(args)) {
      None => true,
      Some(entry) => entry.last_args.as_ref() != Some(args),
    }
  }

  /// Look up or create the entry for `args`, dispatching a fetch if needed.
  ///
  /// Identical arguments serve straight from cache. Changed arguments
  /// dispatch a fetch whose result is merged per the cache's merge mode.
  /// A duplicate request while the same (key, args) fetch is in flight
  /// coalesces into the pending fetch.
  pub fn request(&mut self, args: A) -> &CacheEntry<A, T> {
    let key = (self.key_of)(&args);
    let refetch = self.should_refetch(&args);

    let name = self.name;
    let entry = self
      .entries
      .entry(key.clone())
      .or_insert_with(CacheEntry::new);

    if refetch {
      if entry.in_flight.iter().any(|(_, a)| *a == args) {
        debug!(cache = name, key = %key, "coalesced into in-flight fetch");
      } else {
        Self::dispatch(&self.fetcher, name, &key, entry, args);
      }
    }

    entry
  }

  /// Re-issue the entry's last request with identical arguments.
  ///
  /// Used by views to retry after an error; a no-op if that exact fetch is
  /// already in flight or the entry never dispatched.
  pub fn retry(&mut self, args: &A) {
    let key = (self.key_of)(args);
    if let Some(entry) = self.entries.get_mut(&key) {
      let Some(last) = entry.last_args.clone() else {
        return;
      };
      if entry.in_flight.iter().any(|(_, a)| *a == last) {
        return;
      }
      Self::dispatch(&self.fetcher, self.name, &key, entry, last);
    }
  }

  /// Apply completed fetches, in dispatch order, across all entries.
  ///
  /// Returns `true` if any entry changed. Call this from the event loop tick.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    for (key, entry) in self.entries.iter_mut() {
      while let Ok((seq, result)) = entry.rx.try_recv() {
        entry.in_flight.retain(|(s, _)| *s != seq);
        entry.pending.insert(seq, result);
      }

      // Apply strictly in dispatch order; later completions wait in the
      // buffer until every earlier one has arrived.
      while let Some(result) = entry.pending.remove(&(entry.applied_seq + 1)) {
        entry.applied_seq += 1;
        match result {
          Ok(items) => {
            entry.last_batch_len = Some(items.len());
            debug!(cache = self.name, key = %key, count = items.len(), "applied fetch");
            match self.merge {
              MergeMode::Append => entry.data.extend(items),
              MergeMode::Replace => entry.data = items,
            }
            entry.status = EntryStatus::Loaded;
          }
          Err(message) => {
            debug!(cache = self.name, key = %key, error = %message, "fetch failed");
            entry.status = EntryStatus::Error(message);
          }
        }
        entry.version += 1;
        changed = true;
      }
    }

    changed
  }

  /// Read-only view of the entry for `args`, if one exists.
  pub fn get(&self, args: &A) -> Option<&CacheEntry<A, T>> {
    self.entries.get(&(self.key_of)(args))
  }

  /// Register an observer of the entry for `args`.
  pub fn subscribe(&mut self, args: &A) {
    if let Some(entry) = self.entries.get_mut(&(self.key_of)(args)) {
      entry.subscribers += 1;
    }
  }

  /// Drop an observer; the entry is disposed when the count reaches zero.
  ///
  /// Disposal drops the entry's completion channel, so any still-in-flight
  /// fetch for it finishes into a closed channel and mutates nothing.
  pub fn unsubscribe(&mut self, args: &A) {
    let key = (self.key_of)(args);
    if let Some(entry) = self.entries.get_mut(&key) {
      entry.subscribers = entry.subscribers.saturating_sub(1);
      if entry.subscribers == 0 {
        debug!(cache = self.name, key = %key, "disposing entry");
        self.entries.remove(&key);
      }
    }
  }

  fn dispatch(
    fetcher: &FetcherFn<A, T>,
    name: &'static str,
    key: &str,
    entry: &mut CacheEntry<A, T>,
    args: A,
  ) {
    entry.next_seq += 1;
    let seq = entry.next_seq;
    entry.in_flight.push((seq, args.clone()));
    entry.last_args = Some(args.clone());
    if entry.status == EntryStatus::Uninitialized {
      entry.status = EntryStatus::Loading;
    }

    debug!(cache = name, key = %key, seq, "dispatching fetch");

    let tx = entry.tx.clone();
    let future = (fetcher)(args);
    tokio::spawn(async move {
      // The receiver may be gone if the entry was disposed; that makes the
      // completion a deliberate no-op.
      let _ = tx.send((seq, future.await));
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  #[derive(Debug, Clone, PartialEq)]
  struct Page {
    limit: u32,
    page: u32,
  }

  fn page(limit: u32, page: u32) -> Page {
    Page { limit, page }
  }

  /// Cache over a fake catalog of `total` numbered items, keyed by limit only
  /// so pages accumulate (the breed list wiring).
  fn paged_cache(total: u32, calls: Arc<AtomicU32>) -> QueryCache<Page, u32> {
    QueryCache::new(
      "test-pages",
      MergeMode::Append,
      |args: &Page| format!("items-{}", args.limit),
      move |args: Page| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
          let start = args.page * args.limit;
          let end = (start + args.limit).min(total);
          Ok((start..end).collect())
        }
      },
    )
  }

  async fn settle<A, T>(cache: &mut QueryCache<A, T>)
  where
    A: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
  {
    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.poll();
  }

  #[tokio::test]
  async fn test_pages_accumulate_in_request_order() {
    // 29 items at limit 12: pages of 12, 12, 5
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache = paged_cache(29, calls.clone());

    cache.request(page(12, 0));
    settle(&mut cache).await;
    assert_eq!(cache.get(&page(12, 0)).unwrap().data().len(), 12);

    cache.request(page(12, 1));
    settle(&mut cache).await;
    cache.request(page(12, 2));
    settle(&mut cache).await;

    let entry = cache.get(&page(12, 0)).unwrap();
    assert_eq!(entry.data().len(), 29);
    assert_eq!(entry.data(), (0..29).collect::<Vec<_>>().as_slice());
    assert_eq!(entry.last_batch_len(), Some(5));
    assert_eq!(*entry.status(), EntryStatus::Loaded);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_identical_args_serve_from_cache() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache = paged_cache(100, calls.clone());

    cache.request(page(12, 0));
    settle(&mut cache).await;
    assert!(!cache.should_refetch(&page(12, 0)));

    // Same (key, args) again: no network call
    cache.request(page(12, 0));
    settle(&mut cache).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get(&page(12, 0)).unwrap().data().len(), 12);
  }

  #[tokio::test]
  async fn test_concurrent_duplicates_coalesce() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache = paged_cache(100, calls.clone());

    // Two requests for the same pair before the first completes
    cache.request(page(12, 0));
    cache.request(page(12, 0));
    settle(&mut cache).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get(&page(12, 0)).unwrap().data().len(), 12);
  }

  #[tokio::test]
  async fn test_replace_mode_replaces_data() {
    let mut cache: QueryCache<String, String> = QueryCache::new(
      "test-search",
      MergeMode::Replace,
      |q: &String| format!("search-{}", q),
      |q: String| async move { Ok(vec![format!("{}-match", q)]) },
    );

    cache.request("bull".to_string());
    settle(&mut cache).await;
    assert_eq!(cache.get(&"bull".to_string()).unwrap().data().len(), 1);

    // A different term gets its own entry; the old one is untouched
    cache.request("pug".to_string());
    settle(&mut cache).await;
    assert_eq!(
      cache.get(&"bull".to_string()).unwrap().data(),
      &["bull-match".to_string()]
    );
    assert_eq!(
      cache.get(&"pug".to_string()).unwrap().data(),
      &["pug-match".to_string()]
    );
  }

  #[tokio::test]
  async fn test_error_retains_prior_pages_and_retry_reissues() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fail_page_1 = Arc::new(AtomicU32::new(1));

    let seen_in_fetch = seen.clone();
    let fail = fail_page_1.clone();
    let mut cache = QueryCache::new(
      "test-retry",
      MergeMode::Append,
      |args: &Page| format!("items-{}", args.limit),
      move |args: Page| {
        seen_in_fetch.lock().unwrap().push(args.clone());
        let fail = fail.clone();
        async move {
          if args.page == 1 && fail.swap(0, Ordering::SeqCst) == 1 {
            Err("connection reset".to_string())
          } else {
            let start = args.page * args.limit;
            Ok((start..start + args.limit).collect::<Vec<u32>>())
          }
        }
      },
    );

    cache.request(page(12, 0));
    settle(&mut cache).await;
    cache.request(page(12, 1));
    settle(&mut cache).await;

    // Stale-while-error: page 0 data still served alongside the error
    let entry = cache.get(&page(12, 0)).unwrap();
    assert_eq!(entry.data().len(), 12);
    assert_eq!(entry.error(), Some("connection reset"));

    cache.retry(&page(12, 1));
    settle(&mut cache).await;

    let entry = cache.get(&page(12, 0)).unwrap();
    assert_eq!(entry.data().len(), 24);
    assert_eq!(*entry.status(), EntryStatus::Loaded);

    // The retry re-issued page 1 with identical arguments
    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[page(12, 0), page(12, 1), page(12, 1)]);
  }

  #[tokio::test]
  async fn test_completions_apply_in_dispatch_order() {
    // Page 1 is slow, page 2 is fast; the merged data must still follow
    // dispatch order.
    let mut cache = QueryCache::new(
      "test-order",
      MergeMode::Append,
      |args: &Page| format!("items-{}", args.limit),
      |args: Page| async move {
        let delay = if args.page == 1 { 60 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let start = args.page * args.limit;
        Ok((start..start + args.limit).collect::<Vec<u32>>())
      },
    );

    cache.request(page(4, 0));
    settle(&mut cache).await;
    cache.request(page(4, 1));
    cache.request(page(4, 2));

    tokio::time::sleep(Duration::from_millis(100)).await;
    cache.poll();

    let entry = cache.get(&page(4, 0)).unwrap();
    assert_eq!(entry.data(), (0..12).collect::<Vec<_>>().as_slice());
  }

  #[tokio::test]
  async fn test_unsubscribe_disposes_entry() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache = paged_cache(100, calls.clone());

    cache.request(page(12, 0));
    cache.subscribe(&page(12, 0));
    assert_eq!(cache.get(&page(12, 0)).unwrap().subscribers(), 1);

    // Dispose while the fetch is still in flight; its completion must land
    // in a closed channel without mutating anything.
    cache.unsubscribe(&page(12, 0));
    assert!(cache.get(&page(12, 0)).is_none());

    settle(&mut cache).await;
    assert!(cache.get(&page(12, 0)).is_none());
  }

  #[tokio::test]
  async fn test_fresh_entry_starts_loading() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache = paged_cache(100, calls.clone());

    let entry = cache.request(page(12, 0));
    assert!(entry.is_loading());
    assert!(entry.is_fetching());
    assert!(entry.data().is_empty());
  }
}
