use crate::cache::{Query, QueryState};
use crate::dogapi::client::DogApiClient;
use crate::dogapi::types::{Breed, ImageRecord};
use crate::ui::renderfns::{group_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

/// Images fetched for the gallery pane.
const GALLERY_LIMIT: u32 = 12;

/// Detail page for one breed: profile fields on the left, image gallery on
/// the right, with vote/favourite actions on the selected image.
pub struct BreedDetailView {
  breed_id: u64,
  /// Name from the list row, shown until the detail fetch lands.
  name_hint: String,
  client: DogApiClient,
  detail: Query<(Breed, Vec<ImageRecord>)>,
  /// In-flight vote/favourite mutation, if any.
  action: Option<Query<String>>,
  status: Option<String>,
  image_index: usize,
}

impl BreedDetailView {
  pub fn new(breed_id: u64, name_hint: String, client: DogApiClient) -> Self {
    let detail_client = client.clone();
    let mut detail = Query::new(move || {
      let client = detail_client.clone();
      async move {
        let (breed, images) = tokio::join!(
          client.get_breed(breed_id),
          client.get_breed_images(breed_id, GALLERY_LIMIT, 0),
        );
        let breed = breed.map_err(|e| e.status_line())?;
        // The gallery is decoration; a failed image fetch should not take
        // down the profile
        Ok((breed, images.unwrap_or_default()))
      }
    });
    detail.fetch();

    Self {
      breed_id,
      name_hint,
      client,
      detail,
      action: None,
      status: None,
      image_index: 0,
    }
  }

  fn name(&self) -> &str {
    match self.detail.data() {
      Some((breed, _)) => &breed.name,
      None => &self.name_hint,
    }
  }

  /// Image id the next vote/favourite applies to: the gallery selection,
  /// falling back to the breed's reference image.
  fn selected_image_id(&self) -> Option<String> {
    let (breed, images) = self.detail.data()?;
    if let Some(image) = images.get(self.image_index) {
      return Some(image.id.clone());
    }
    breed.image.as_ref().and_then(|image| image.id.clone())
  }

  fn start_vote(&mut self, value: i32) {
    if self.action.is_some() {
      return;
    }
    let Some(image_id) = self.selected_image_id() else {
      self.status = Some("No image to vote on".to_string());
      return;
    };

    let client = self.client.clone();
    let label = if value > 0 { "Voted up" } else { "Voted down" };
    let mut query = Query::new(move || {
      let client = client.clone();
      let image_id = image_id.clone();
      async move {
        client
          .create_vote(&image_id, value)
          .await
          .map(|ack| format!("{} {} (vote #{})", label, image_id, ack.id))
          .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    self.status = Some("Submitting vote...".to_string());
    self.action = Some(query);
  }

  fn start_favourite(&mut self) {
    if self.action.is_some() {
      return;
    }
    let Some(image_id) = self.selected_image_id() else {
      self.status = Some("No image to favourite".to_string());
      return;
    };

    let client = self.client.clone();
    let mut query = Query::new(move || {
      let client = client.clone();
      let image_id = image_id.clone();
      async move {
        client
          .create_favourite(&image_id)
          .await
          .map(|ack| format!("Favourited {} (#{})", image_id, ack.id))
          .map_err(|e| e.to_string())
      }
    });
    query.fetch();
    self.status = Some("Favouriting...".to_string());
    self.action = Some(query);
  }

  fn gallery_len(&self) -> usize {
    self.detail.data().map(|(_, images)| images.len()).unwrap_or(0)
  }

  fn render_profile(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.name()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines: Vec<Line> = Vec::new();

    match self.detail.state() {
      QueryState::Idle | QueryState::Loading => {
        lines.push(Line::from(Span::styled(
          "Loading breed...",
          Style::default().fg(Color::DarkGray),
        )));
      }
      QueryState::Error(e) => {
        lines.push(Line::from(Span::styled(
          format!("Failed to load breed {}: {}", self.breed_id, e),
          Style::default().fg(Color::Red),
        )));
      }
      QueryState::Success((breed, _)) => {
        let field = |label: &str, value: Option<&str>| -> Line {
          Line::from(vec![
            Span::styled(
              format!("{:<12}", label),
              Style::default().fg(Color::DarkGray),
            ),
            Span::raw(value.unwrap_or("-").to_string()),
          ])
        };

        lines.push(Line::from(vec![
          Span::styled("Group       ", Style::default().fg(Color::DarkGray)),
          Span::styled(
            breed.breed_group.as_deref().unwrap_or("-").to_string(),
            Style::default().fg(group_color(breed.breed_group.as_deref())),
          ),
        ]));
        lines.push(field("Bred for", breed.bred_for.as_deref()));
        lines.push(field("Life span", breed.life_span.as_deref()));
        lines.push(field(
          "Weight",
          breed
            .weight
            .as_ref()
            .and_then(|m| m.metric.as_deref()),
        ));
        lines.push(field(
          "Height",
          breed
            .height
            .as_ref()
            .and_then(|m| m.metric.as_deref()),
        ));
        lines.push(field("Origin", breed.origin.as_deref()));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
          "Temperament",
          Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(
          breed.temperament.as_deref().unwrap_or("-").to_string(),
        ));
      }
    }

    if let Some(status) = &self.status {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        status.clone(),
        Style::default().fg(Color::Yellow),
      )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }

  fn render_gallery(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Images ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let Some((_, images)) = self.detail.data() else {
      let paragraph = Paragraph::new("")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    };

    if images.is_empty() {
      let paragraph = Paragraph::new("No images.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let width = area.width.saturating_sub(16).max(8) as usize;
    let items: Vec<ListItem> = images
      .iter()
      .enumerate()
      .map(|(i, image)| {
        let marker = if i == self.image_index { "> " } else { "  " };
        let style = if i == self.image_index {
          Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
          Style::default().fg(Color::DarkGray)
        };
        ListItem::new(Line::from(vec![
          Span::styled(format!("{}{:<10}", marker, image.id), style),
          Span::raw(" "),
          Span::styled(
            truncate(&image.url, width),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    frame.render_widget(List::new(items).block(block), area);
  }
}

impl View for BreedDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('l') | KeyCode::Right => {
        let len = self.gallery_len();
        if len > 0 {
          self.image_index = (self.image_index + 1) % len;
        }
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('h') | KeyCode::Left => {
        let len = self.gallery_len();
        if len > 0 {
          self.image_index = (self.image_index + len - 1) % len;
        }
        ViewAction::None
      }
      KeyCode::Char('v') => {
        self.start_vote(1);
        ViewAction::None
      }
      KeyCode::Char('d') => {
        self.start_vote(-1);
        ViewAction::None
      }
      KeyCode::Char('f') => {
        self.start_favourite();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.status = None;
        self.image_index = 0;
        self.detail.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
      .split(area);

    self.render_profile(frame, chunks[0]);
    self.render_gallery(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.name().to_string()
  }

  fn tick(&mut self) {
    self.detail.poll();

    if let Some(mut action) = self.action.take() {
      if action.poll() {
        self.status = match action.state() {
          QueryState::Success(message) => Some(message.clone()),
          QueryState::Error(e) => Some(format!("Action failed: {}", e)),
          _ => self.status.take(),
        };
      } else {
        self.action = Some(action);
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("j/k", "images"),
      Shortcut::new("v/d", "vote up/down"),
      Shortcut::new("f", "favourite"),
      Shortcut::new("r", "reload"),
      Shortcut::new("q", "back"),
    ]
  }
}
