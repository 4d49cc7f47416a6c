//! One-shot async query with loading/error state.
//!
//! `Query<T>` covers the uncached lookups (breed detail, gallery, votes,
//! favourites): start a fetch, poll for the result from the event-loop tick,
//! render the state. Keyed, merging queries live in [`super::store`].

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// The state of a query.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Not started.
  Idle,
  /// Fetch in flight.
  Loading,
  /// Completed successfully.
  Success(T),
  /// Failed.
  Error(String),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async data fetch with state management, polled from the tick handler.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a query from a fetcher closure. The closure is invoked on each
  /// `fetch`/`refetch` and must capture everything it needs by value.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.state, QueryState::Error(_))
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start fetching; no-op if already loading.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch. A pending fetch is cancelled by dropping its receiver,
  /// so a late completion cannot overwrite the new result.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for a completion. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.state = QueryState::Error("query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });
    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(query.poll());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("boom".to_string()) });
    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.error(), Some("boom"));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(42)
    });

    query.fetch();
    query.fetch();
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn test_refetch_discards_pending_result() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(20)).await;
      Ok::<_, String>(1)
    });

    query.fetch();
    query.refetch();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&1));
  }
}
