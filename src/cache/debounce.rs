//! Debounced input: decouple rapid keystrokes from network fetches.

use std::time::{Duration, Instant};

/// Tracks a raw value updated on every keystroke and a committed value that
/// only changes after the input has been stable for a quiet interval.
///
/// Polled from the event loop tick, like queries. Every `set` resets the
/// quiet-interval timer, so only the final value after the user pauses is
/// committed.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
  raw: String,
  committed: String,
  quiet: Duration,
  dirty_since: Option<Instant>,
}

impl DebouncedInput {
  pub fn new(quiet: Duration) -> Self {
    Self {
      raw: String::new(),
      committed: String::new(),
      quiet,
      dirty_since: None,
    }
  }

  /// The value as typed, updated synchronously.
  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// The last committed value.
  pub fn committed(&self) -> &str {
    &self.committed
  }

  /// Update the raw value and restart the quiet-interval timer.
  pub fn set(&mut self, text: impl Into<String>) {
    self.set_at(text, Instant::now());
  }

  fn set_at(&mut self, text: impl Into<String>, now: Instant) {
    self.raw = text.into();
    self.dirty_since = Some(now);
  }

  /// Commit the raw value if the quiet interval has elapsed.
  ///
  /// Returns the newly committed value, or `None` when nothing is pending,
  /// the input is still settling, or the settled value equals the committed
  /// one.
  pub fn poll(&mut self) -> Option<String> {
    self.poll_at(Instant::now())
  }

  fn poll_at(&mut self, now: Instant) -> Option<String> {
    let since = self.dirty_since?;
    if now.duration_since(since) < self.quiet {
      return None;
    }
    self.dirty_since = None;
    if self.raw == self.committed {
      return None;
    }
    self.committed = self.raw.clone();
    Some(self.committed.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[test]
  fn test_commit_after_quiet_interval() {
    let mut input = DebouncedInput::new(ms(300));
    let t0 = Instant::now();

    input.set_at("b", t0);
    assert_eq!(input.poll_at(t0 + ms(100)), None);
    assert_eq!(input.poll_at(t0 + ms(300)), Some("b".to_string()));
    assert_eq!(input.committed(), "b");
  }

  #[test]
  fn test_each_keystroke_resets_timer() {
    // Keystrokes at t=0, 50, 100, 300; quiet interval 300ms.
    // Exactly one commit, at t=600, with the final value.
    let mut input = DebouncedInput::new(ms(300));
    let t0 = Instant::now();

    input.set_at("b", t0);
    input.set_at("bu", t0 + ms(50));
    input.set_at("bul", t0 + ms(100));
    input.set_at("bull", t0 + ms(300));

    assert_eq!(input.poll_at(t0 + ms(400)), None);
    assert_eq!(input.poll_at(t0 + ms(599)), None);
    assert_eq!(input.poll_at(t0 + ms(600)), Some("bull".to_string()));
    // Nothing further pending
    assert_eq!(input.poll_at(t0 + ms(1000)), None);
  }

  #[test]
  fn test_rapid_refinement_commits_once() {
    // "bull" then "bulldog" within the quiet interval: one commit, for
    // "bulldog" only.
    let mut input = DebouncedInput::new(ms(300));
    let t0 = Instant::now();

    input.set_at("bull", t0);
    input.set_at("bulldog", t0 + ms(200));

    assert_eq!(input.poll_at(t0 + ms(300)), None);
    assert_eq!(input.poll_at(t0 + ms(500)), Some("bulldog".to_string()));
    assert_eq!(input.poll_at(t0 + ms(900)), None);
  }

  #[test]
  fn test_settling_back_to_committed_value_is_silent() {
    let mut input = DebouncedInput::new(ms(300));
    let t0 = Instant::now();

    input.set_at("pug", t0);
    assert_eq!(input.poll_at(t0 + ms(300)), Some("pug".to_string()));

    // Type something, then erase back to the committed value
    input.set_at("pugx", t0 + ms(400));
    input.set_at("pug", t0 + ms(450));
    assert_eq!(input.poll_at(t0 + ms(800)), None);
  }
}
