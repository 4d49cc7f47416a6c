use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::config::Theme;
use crate::ui::view::Shortcut;

/// Draw the header bar with logo, API host, and the current view's shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  api_url: &str,
  theme: Theme,
  shortcuts: &[Shortcut],
) {
  let accent = theme.accent();
  let dim = theme.dim();

  let mut spans = vec![
    Span::styled(" d9s ", Style::default().fg(accent).bold()),
    Span::styled("│", Style::default().fg(dim)),
    Span::styled(
      format!(" {} ", extract_domain(api_url)),
      Style::default().fg(theme.text()),
    ),
    Span::raw("  "),
  ];

  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(accent),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(dim),
    ));
    spans.push(Span::raw("   "));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg()));
  frame.render_widget(paragraph, area);
}

/// Extract domain from the API URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://api.thedogapi.com/v1"),
      "api.thedogapi.com"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
    assert_eq!(extract_domain("api.thedogapi.com"), "api.thedogapi.com");
  }
}
