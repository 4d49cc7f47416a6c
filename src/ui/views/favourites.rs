use crate::cache::{Query, QueryState};
use crate::dogapi::client::DogApiClient;
use crate::dogapi::types::Favourite;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Favourited images, with removal.
pub struct FavouritesView {
  client: DogApiClient,
  query: Query<Vec<Favourite>>,
  /// In-flight removal; the list refetches when it completes.
  delete: Option<Query<u64>>,
  status: Option<String>,
  list_state: ListState,
}

impl FavouritesView {
  pub fn new(client: DogApiClient) -> Self {
    let query_client = client.clone();
    let mut query = Query::new(move || {
      let client = query_client.clone();
      async move { client.get_favourites().await.map_err(|e| e.status_line()) }
    });
    query.fetch();

    Self {
      client,
      query,
      delete: None,
      status: None,
      list_state: ListState::default(),
    }
  }

  fn selected(&self) -> Option<&Favourite> {
    let favourites = self.query.data()?;
    favourites.get(self.list_state.selected()?)
  }

  fn start_delete(&mut self) {
    if self.delete.is_some() {
      return;
    }
    let Some(favourite) = self.selected() else {
      return;
    };
    let id = favourite.id;

    let client = self.client.clone();
    let mut query = Query::new(move || {
      let client = client.clone();
      async move {
        client
          .delete_favourite(id)
          .await
          .map(|_| id)
          .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    self.status = Some(format!("Removing favourite #{}...", id));
    self.delete = Some(query);
  }
}

impl View for FavouritesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('x') | KeyCode::Delete => {
        self.start_delete();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.status = None;
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let count = self.query.data().map(Vec::len).unwrap_or(0);
    let title = match self.query.state() {
      QueryState::Idle | QueryState::Loading => " Favourites (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Favourites (error: {}) ", e),
      QueryState::Success(_) => format!(" Favourites ({}) ", count),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let Some(favourites) = self.query.data() else {
      let content = match self.query.state() {
        QueryState::Error(e) => format!("Failed to load favourites: {}", e),
        _ => "Loading favourites...".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    };

    if favourites.is_empty() {
      let paragraph = Paragraph::new("No favourites yet. Press 'f' on a breed image to add one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.list_state, favourites.len());

    let items: Vec<ListItem> = favourites
      .iter()
      .map(|favourite| {
        let url = favourite
          .image
          .as_ref()
          .map(|image| image.url.as_str())
          .unwrap_or("-");
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("#{:<8}", favourite.id),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("{:<12}", favourite.image_id),
            Style::default().fg(Color::White),
          ),
          Span::styled(
            format!("{:<22}", favourite.created_at.format("%Y-%m-%d %H:%M UTC")),
            Style::default().fg(Color::DarkGray),
          ),
          Span::styled(truncate(url, 48), Style::default().fg(Color::DarkGray)),
        ]))
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

  fn breadcrumb_label(&self) -> String {
    let mut label = "Favourites".to_string();
    if let Some(status) = &self.status {
      label.push_str(&format!(" ({})", status));
    }
    label
  }

  fn tick(&mut self) {
    self.query.poll();

    if let Some(mut delete) = self.delete.take() {
      if delete.poll() {
        match delete.state() {
          QueryState::Success(id) => {
            self.status = Some(format!("Removed favourite #{}", id));
            self.query.refetch();
          }
          QueryState::Error(e) => {
            self.status = Some(format!("Remove failed: {}", e));
          }
          _ => {}
        }
      } else {
        self.delete = Some(delete);
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("j/k", "navigate"),
      Shortcut::new("x", "remove"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
