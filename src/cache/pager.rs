//! Infinite-scroll pagination state machine.

/// Arguments for one page fetch. Drives a single request; the result is
/// appended to the page-family cache entry, never replacing prior pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub limit: u32,
  /// 0-based page index.
  pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
  /// No fetch in flight; a near-end trigger may start one.
  Idle,
  /// The next page is being fetched.
  FetchingNext,
  /// A short page signalled end-of-collection; no more automatic fetches.
  ///
  /// This is a heuristic: the API does not guarantee that a page shorter
  /// than the requested limit is the last one.
  Exhausted,
  /// The last page fetch failed; forward progress blocked until retried.
  Error,
}

/// Drives page-advance fetches for the breed list.
///
/// The near-end trigger (selection close to the list bottom) starts fetches
/// before the user reaches the true end. While suspended (active search) no automatic
/// fetches happen, but the reached page is kept so that clearing the search
/// resumes where pagination left off.
#[derive(Debug, Clone)]
pub struct Pager {
  limit: u32,
  next_page: u32,
  state: PagerState,
  suspended: bool,
}

impl Pager {
  pub fn new(limit: u32) -> Self {
    Self {
      limit,
      next_page: 0,
      state: PagerState::Idle,
      suspended: false,
    }
  }

  pub fn state(&self) -> PagerState {
    self.state
  }

  pub fn limit(&self) -> u32 {
    self.limit
  }

  pub fn is_suspended(&self) -> bool {
    self.suspended
  }

  /// Number of pages successfully fetched so far.
  pub fn pages_loaded(&self) -> u32 {
    self.next_page
  }

  /// Edge-detected trigger: yields the next page request when the view is
  /// near the end and no fetch is in flight.
  pub fn next_request(&mut self, near_end: bool) -> Option<PageRequest> {
    if self.suspended || !near_end || self.state != PagerState::Idle {
      return None;
    }
    self.state = PagerState::FetchingNext;
    Some(PageRequest {
      limit: self.limit,
      page: self.next_page,
    })
  }

  /// Record a successful page of `count` items.
  pub fn on_page(&mut self, count: usize) {
    if self.state != PagerState::FetchingNext {
      return;
    }
    self.next_page += 1;
    self.state = if (count as u32) < self.limit {
      PagerState::Exhausted
    } else {
      PagerState::Idle
    };
  }

  /// Record a failed page fetch.
  pub fn on_error(&mut self) {
    if self.state == PagerState::FetchingNext {
      self.state = PagerState::Error;
    }
  }

  /// Manual retry after an error: re-issues the same page request.
  pub fn retry(&mut self) -> Option<PageRequest> {
    if self.state != PagerState::Error {
      return None;
    }
    self.state = PagerState::FetchingNext;
    Some(PageRequest {
      limit: self.limit,
      page: self.next_page,
    })
  }

  /// Stop automatic fetching while a search is active.
  pub fn suspend(&mut self) {
    self.suspended = true;
  }

  /// Resume automatic fetching from the last reached page, not page 0.
  pub fn resume(&mut self) {
    self.suspended = false;
  }
}
