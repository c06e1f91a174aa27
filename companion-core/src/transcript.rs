//! Conversation transcript: ordered turns, bounded history window, reset.

use serde::{Deserialize, Serialize};

/// Canned assistant turn that (re)seeds a session.
pub const GREETING: &str = "Ask me anything about our products and campaigns!";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// A user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Append-only turn sequence for one session.
///
/// Unbounded for display; [`Transcript::window`] exposes at most the W most
/// recent dialogue turns for history context. The seeded greeting is
/// display-only and never enters the window, so the first question of a
/// fresh session carries no history.
///
/// The orchestrator is the only writer, and only at turn boundaries: both
/// turns of a round are appended after a successful completion, or nothing
/// is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    #[serde(skip)]
    seeded: bool,
}

impl Transcript {
    /// An empty transcript with no greeting.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session transcript holding only the canned greeting.
    pub fn seeded() -> Self {
        let mut t = Self::default();
        t.reset();
        t
    }

    /// Clears all turns unconditionally and reseeds the greeting.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::assistant(GREETING));
        self.seeded = true;
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, greeting included, for display.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent dialogue turns, at most `w` of them, excluding the
    /// seeded greeting.
    pub fn window(&self, w: usize) -> &[Turn] {
        let dialogue = if self.seeded {
            &self.turns[1..]
        } else {
            &self.turns[..]
        };
        let start = dialogue.len().saturating_sub(w);
        &dialogue[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_bounded_to_most_recent() {
        let mut t = Transcript::new();
        for i in 0..10 {
            t.push(Turn::user(format!("q{i}")));
            t.push(Turn::assistant(format!("a{i}")));
        }
        let w = t.window(7);
        assert_eq!(w.len(), 7);
        // Last seven turns: a6, q7, a7, q8, a8, q9, a9.
        assert_eq!(w[0].text, "a6");
        assert_eq!(w[6].text, "a9");
    }

    #[test]
    fn window_shorter_than_w_returns_everything() {
        let mut t = Transcript::new();
        t.push(Turn::user("q"));
        t.push(Turn::assistant("a"));
        assert_eq!(t.window(7).len(), 2);
    }

    #[test]
    fn seeded_greeting_is_excluded_from_window() {
        let t = Transcript::seeded();
        assert_eq!(t.len(), 1);
        assert!(t.window(7).is_empty());

        let mut t = Transcript::seeded();
        t.push(Turn::user("q"));
        t.push(Turn::assistant("a"));
        let w = t.window(7);
        assert_eq!(w.len(), 2);
        assert!(w.iter().all(|turn| turn.text != GREETING));
    }

    #[test]
    fn reset_leaves_exactly_the_greeting() {
        let mut t = Transcript::new();
        for i in 0..5 {
            t.push(Turn::user(format!("q{i}")));
            t.push(Turn::assistant(format!("a{i}")));
        }
        t.reset();
        assert_eq!(t.len(), 1);
        assert_eq!(t.turns()[0], Turn::assistant(GREETING));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let turn = Turn::user("hello");
        let v = serde_json::to_value(&turn).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["text"], "hello");
    }
}
