use std::io;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use tracing::info;

use crate::config::Config;
use crate::dogapi::client::DogApiClient;
use crate::dogapi::error::parse_breed_id;
use crate::dogapi::queries::{BreedQueries, SharedQueries};
use crate::event::{Event, EventHandler};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{BreedDetailView, BreedListView, FavouritesView, VotesView};

/// Tick interval; drives query polling and the search debounce timer.
const TICK_RATE: Duration = Duration::from_millis(50);

/// Application root: owns the view stack, the shared query caches, and the
/// command overlay.
pub struct App {
  config: Config,
  client: DogApiClient,
  queries: SharedQueries,
  views: Vec<Box<dyn View>>,
  command: CommandInput,
  status: Option<String>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = DogApiClient::new(&config)?;
    let queries = BreedQueries::shared(client.clone());
    let root = BreedListView::new(client.clone(), queries.clone(), config.page_size);

    Ok(Self {
      config,
      client,
      queries,
      views: vec![Box::new(root)],
      command: CommandInput::new(),
      status: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = self.event_loop(&mut terminal).await;

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        None => break,
      }
    }

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
      ])
      .split(frame.area());

    let theme = self.config.theme;
    let shortcuts = match self.views.last() {
      Some(view) => view.shortcuts(),
      None => Vec::new(),
    };
    let header_label = self
      .config
      .title
      .as_deref()
      .unwrap_or(&self.config.api.url);
    draw_header(frame, chunks[0], header_label, theme, &shortcuts);

    if let Some(view) = self.views.last_mut() {
      view.render(frame, chunks[1]);
    }

    self.command.render_overlay(frame, chunks[1]);

    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    draw_footer(
      frame,
      chunks[2],
      &breadcrumb,
      self.status.as_deref(),
      theme,
    );
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.command.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(CommandEvent::Submitted(command)) => {
        self.execute_command(&command);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::NotHandled => {}
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        self.status = None;
        self.views.push(view);
      }
      ViewAction::Pop => {
        self.status = None;
        if self.views.len() > 1 {
          self.views.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, command: &str) {
    info!(command, "executing command");
    self.status = None;

    let (name, args) = match command.split_once(char::is_whitespace) {
      Some((head, rest)) => (head, rest.trim()),
      None => (command, ""),
    };

    match name {
      "breeds" => {
        self.views = vec![Box::new(BreedListView::new(
          self.client.clone(),
          self.queries.clone(),
          self.config.page_size,
        ))];
      }
      "open" => match parse_breed_id(args) {
        Ok(id) => {
          self
            .views
            .push(Box::new(BreedDetailView::new(id, String::new(), self.client.clone())));
        }
        Err(e) => self.status = Some(e.to_string()),
      },
      "favourites" => {
        self.views.push(Box::new(FavouritesView::new(self.client.clone())));
      }
      "votes" => {
        self.views.push(Box::new(VotesView::new(self.client.clone())));
      }
      "quit" => self.should_quit = true,
      other => self.status = Some(format!("Unknown command: {}", other)),
    }
  }

  fn tick(&mut self) {
    if let Some(view) = self.views.last_mut() {
      view.tick();
    }
  }
}
