use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::config::Theme;

/// Draw the footer bar with view breadcrumb and an optional status message
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  status: Option<&str>,
  theme: Theme,
) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(theme.dim())));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(theme.accent()).bold()
    } else {
      Style::default().fg(theme.text())
    };

    spans.push(Span::styled(part.clone(), style));
  }

  if let Some(message) = status {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      message.to_string(),
      Style::default().fg(Color::Red),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg()));
  frame.render_widget(paragraph, area);
}
