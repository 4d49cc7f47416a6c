use crate::cache::{CacheEntry, DebouncedInput, EntryStatus, PageRequest, Pager, PagerState};
use crate::dogapi::client::DogApiClient;
use crate::dogapi::queries::SharedQueries;
use crate::dogapi::types::Breed;
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{group_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BreedDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::time::Duration;

/// Rows of look-ahead before the list bottom that trigger the next page
/// fetch, so loading starts before the user reaches the true end.
const LOOKAHEAD_ROWS: usize = 12;

/// Quiet interval before a typed search query is committed.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// The breed catalog: an infinite-scroll list over the paginated cache
/// entry, with a debounced search that forks to per-term entries and
/// resumes pagination when cleared.
pub struct BreedListView {
  client: DogApiClient,
  queries: SharedQueries,

  pager: Pager,
  debounce: DebouncedInput,
  /// Committed non-empty search term; `None` renders the paginated entry.
  active_search: Option<String>,
  /// Representative args for the page-family cache key (limit only).
  page_args: PageRequest,
  /// Last pages-entry version folded into the pager.
  seen_version: u64,
  subscribed: bool,

  list_state: ListState,
  search: SearchInput,
}

impl BreedListView {
  pub fn new(client: DogApiClient, queries: SharedQueries, page_size: u32) -> Self {
    Self {
      client,
      queries,
      pager: Pager::new(page_size),
      debounce: DebouncedInput::new(SEARCH_DEBOUNCE),
      active_search: None,
      page_args: PageRequest {
        limit: page_size,
        page: 0,
      },
      seen_version: 0,
      subscribed: false,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  /// Snapshot the displayed breeds (search entry when a term is committed,
  /// the paginated entry otherwise).
  fn displayed(&self) -> (Vec<Breed>, EntryStatus, bool) {
    let queries = self.queries.lock().unwrap();
    match &self.active_search {
      Some(term) => snapshot(queries.search.get(term)),
      None => snapshot(queries.pages.get(&self.page_args)),
    }
  }

  /// Fold a committed search value into pager and cache state.
  fn apply_committed_search(&mut self, committed: String) {
    let mut queries = self.queries.lock().unwrap();

    if committed.is_empty() {
      // Back to the paginated entry, resuming from the reached page
      if let Some(old) = self.active_search.take() {
        queries.search.unsubscribe(&old);
      }
      self.pager.resume();
    } else {
      match self.active_search.replace(committed.clone()) {
        Some(old) => queries.search.unsubscribe(&old),
        None => self.pager.suspend(),
      }
      queries.search.request(committed.clone());
      queries.search.subscribe(&committed);
      self.list_state.select(None);
    }
  }

  fn retry(&mut self) {
    let mut queries = self.queries.lock().unwrap();
    match &self.active_search {
      Some(term) => queries.search.retry(term),
      None => {
        if self.pager.retry().is_some() {
          queries.pages.retry(&self.page_args);
        }
      }
    }
  }

  fn open_selected(&mut self) -> ViewAction {
    let Some(idx) = self.list_state.selected() else {
      return ViewAction::None;
    };
    let (breeds, _, _) = self.displayed();
    match breeds.get(idx) {
      Some(breed) => ViewAction::Push(Box::new(BreedDetailView::new(
        breed.id,
        breed.name.clone(),
        self.client.clone(),
      ))),
      None => ViewAction::None,
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let (breeds, status, fetching) = self.displayed();
    ensure_valid_selection(&mut self.list_state, breeds.len());

    let title = self.title(&breeds, &status, fetching);

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if breeds.is_empty() {
      let content = match &status {
        EntryStatus::Error(e) => format!("Failed to load breeds: {}", e),
        EntryStatus::Loaded => match &self.active_search {
          Some(term) => format!("No breeds found for '{}'.", term),
          None => "No breeds found.".to_string(),
        },
        _ => "Loading breeds...".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = breeds
      .iter()
      .map(|breed| {
        let color = group_color(breed.breed_group.as_deref());
        let line = Line::from(vec![
          Span::styled(
            format!("{:<26}", truncate(&breed.name, 26)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<14}", breed.breed_group.as_deref().unwrap_or("-")),
            Style::default().fg(color),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<14}", breed.life_span.as_deref().unwrap_or("-")),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::raw(truncate(breed.temperament.as_deref().unwrap_or(""), 48)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn title(&self, breeds: &[Breed], status: &EntryStatus, fetching: bool) -> String {
    if let Some(term) = &self.active_search {
      return match status {
        EntryStatus::Error(e) => format!(" Breeds /{} (error: {}) ", term, e),
        _ if fetching => format!(" Breeds /{} (searching...) ", term),
        _ => format!(" Breeds /{} ({}) ", term, breeds.len()),
      };
    }

    match status {
      EntryStatus::Error(e) => format!(" Breeds (error: {}) ", e),
      EntryStatus::Uninitialized | EntryStatus::Loading => " Breeds (loading...) ".to_string(),
      EntryStatus::Loaded => match self.pager.state() {
        PagerState::FetchingNext => format!(" Breeds ({}, loading more...) ", breeds.len()),
        PagerState::Exhausted => format!(" Breeds ({}, all loaded) ", breeds.len()),
        _ => format!(" Breeds ({}) ", breeds.len()),
      },
    }
  }

  // Key handling helpers for the or_else chain pattern
  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.search.handle_key(key) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(SearchEvent::Changed(text)) => {
        self.debounce.set(text);
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted) => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        self.retry();
        Some(ViewAction::None)
      }
      KeyCode::Enter => Some(self.open_selected()),
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }
}

impl View for BreedListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.active_search {
      Some(term) => format!("Breeds /{}", term),
      None => "Breeds".to_string(),
    }
  }

  fn tick(&mut self) {
    if let Some(committed) = self.debounce.poll() {
      self.apply_committed_search(committed);
    }

    let mut queries = self.queries.lock().unwrap();
    queries.poll();

    // Fold page completions into the pager, in the order they were applied
    if let Some(entry) = queries.pages.get(&self.page_args) {
      if entry.version() > self.seen_version {
        self.seen_version = entry.version();
        match entry.status() {
          EntryStatus::Error(_) => self.pager.on_error(),
          EntryStatus::Loaded => {
            if let Some(count) = entry.last_batch_len() {
              self.pager.on_page(count);
            }
          }
          _ => {}
        }
      }
    }

    // Near-end trigger: advance pagination when the selection approaches
    // the end of the accumulated list (suspended while searching)
    let len = queries
      .pages
      .get(&self.page_args)
      .map(|e| e.data().len())
      .unwrap_or(0);
    let near_end = match self.list_state.selected() {
      None => true,
      Some(selected) => selected + LOOKAHEAD_ROWS >= len,
    };
    if let Some(request) = self.pager.next_request(near_end) {
      queries.pages.request(request);
      if !self.subscribed {
        queries.pages.subscribe(&request);
        self.subscribed = true;
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("/", "search"),
      Shortcut::new("j/k", "navigate"),
      Shortcut::new("Enter", "details"),
      Shortcut::new("q", "quit"),
    ]
  }
}

impl Drop for BreedListView {
  fn drop(&mut self) {
    // Release cache entries so in-flight completions become no-ops
    if let Ok(mut queries) = self.queries.lock() {
      if self.subscribed {
        queries.pages.unsubscribe(&self.page_args);
      }
      if let Some(term) = self.active_search.take() {
        queries.search.unsubscribe(&term);
      }
    }
  }
}

/// Render-ready copy of a cache entry, regardless of how the entry is keyed.
fn snapshot<A, T: Clone>(entry: Option<&CacheEntry<A, T>>) -> (Vec<T>, EntryStatus, bool) {
  match entry {
    Some(entry) => (
      entry.data().to_vec(),
      entry.status().clone(),
      entry.is_fetching(),
    ),
    None => (Vec::new(), EntryStatus::Uninitialized, false),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MergeMode, QueryCache};
  use std::time::Duration;

  fn req(limit: u32, page: u32) -> PageRequest {
    PageRequest { limit, page }
  }

  #[tokio::test]
  async fn test_snapshot_reads_page_and_search_entries() {
    // The list renders from either cache depending on the committed search
    // term; both entry shapes must reduce to the same display tuple.
    let mut pages: QueryCache<PageRequest, u32> = QueryCache::new(
      "pages",
      MergeMode::Append,
      |args: &PageRequest| format!("items-{}", args.limit),
      |args: PageRequest| async move { Ok(vec![args.page]) },
    );
    let mut search: QueryCache<String, u32> = QueryCache::new(
      "search",
      MergeMode::Replace,
      |q: &String| q.clone(),
      |_q: String| async move { Ok(vec![7]) },
    );

    let (data, status, fetching) = snapshot(pages.get(&req(12, 0)));
    assert!(data.is_empty());
    assert_eq!(status, EntryStatus::Uninitialized);
    assert!(!fetching);

    pages.request(req(12, 0));
    search.request("pug".to_string());
    tokio::time::sleep(Duration::from_millis(20)).await;
    pages.poll();
    search.poll();

    let (data, status, fetching) = snapshot(pages.get(&req(12, 0)));
    assert_eq!(data, vec![0]);
    assert_eq!(status, EntryStatus::Loaded);
    assert!(!fetching);

    let (data, status, _) = snapshot(search.get(&"pug".to_string()));
    assert_eq!(data, vec![7]);
    assert_eq!(status, EntryStatus::Loaded);
  }
}
