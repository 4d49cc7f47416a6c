//! Cache wiring for the breed catalog endpoints.
//!
//! This is where query-key identity is decided:
//! - breed pages are keyed by page size only, so every page fetched at a
//!   given size accumulates into one growing entry;
//! - searches are keyed by the full query text, so each term gets its own
//!   entry and switching terms never clobbers the paginated entry.

use std::sync::{Arc, Mutex};

use crate::cache::{MergeMode, PageRequest, QueryCache};
use crate::dogapi::client::DogApiClient;
use crate::dogapi::types::Breed;

/// The session's breed query caches.
///
/// Owned by the application root and handed to views as a shared service;
/// there is no module-level singleton.
pub struct BreedQueries {
  pub pages: QueryCache<PageRequest, Breed>,
  pub search: QueryCache<String, Breed>,
}

pub type SharedQueries = Arc<Mutex<BreedQueries>>;

impl BreedQueries {
  pub fn new(client: DogApiClient) -> Self {
    let pages_client = client.clone();
    let pages = QueryCache::new(
      "breed-pages",
      MergeMode::Append,
      |args: &PageRequest| format!("breeds-{}", args.limit),
      move |args: PageRequest| {
        let client = pages_client.clone();
        async move {
          client
            .get_breeds(args.limit, args.page)
            .await
            .map_err(|e| e.status_line())
        }
      },
    );

    let search = QueryCache::new(
      "breed-search",
      MergeMode::Replace,
      |q: &String| format!("breeds-search-{}", q),
      move |q: String| {
        let client = client.clone();
        async move { client.search_breeds(&q).await.map_err(|e| e.status_line()) }
      },
    );

    Self { pages, search }
  }

  pub fn shared(client: DogApiClient) -> SharedQueries {
    Arc::new(Mutex::new(Self::new(client)))
  }

  /// Poll both caches; true if anything changed.
  pub fn poll(&mut self) -> bool {
    let pages_changed = self.pages.poll();
    let search_changed = self.search.poll();
    pages_changed || search_changed
  }
}
