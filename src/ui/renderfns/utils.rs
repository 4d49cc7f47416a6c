use ratatui::prelude::Color;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

/// Display color for a breed group
pub fn group_color(group: Option<&str>) -> Color {
  match group {
    Some("Working") | Some("Herding") => Color::Yellow,
    Some("Toy") | Some("Non-Sporting") => Color::Magenta,
    Some("Sporting") | Some("Hound") => Color::Green,
    Some("Terrier") => Color::Cyan,
    _ => Color::White,
  }
}

/// Display color for a vote value
pub fn vote_color(value: i32) -> Color {
  if value > 0 {
    Color::Green
  } else {
    Color::Red
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("pug", 10), "pug");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("beagle", 6), "beagle");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("affenpinscher", 8), "affen...");
  }

  #[test]
  fn test_group_color_known_groups() {
    assert_eq!(group_color(Some("Working")), Color::Yellow);
    assert_eq!(group_color(Some("Terrier")), Color::Cyan);
  }

  #[test]
  fn test_group_color_default() {
    assert_eq!(group_color(None), Color::White);
    assert_eq!(group_color(Some("Mixed")), Color::White);
  }
}
