// src/page/card.rs
// =============================================================================
// Cards: one per displayed item.
//
// Life of a card:
// 1. Cloned from a template in the Loading state, with an animation delay
// 2. Populated exactly once with the CardContent built from its record
// 3. Either rendered into the page, or removed if no record ever arrived
//
// populate() consumes the card and returns the populated one, so a card that
// has been handed to the binder cannot be filled a second time.
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;

/// Offset into the loading animation, always zero or negative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDelay {
    millis: i64,
}

impl AnimationDelay {
    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }
}

// CSS time value: -2s, -1.8s, -0.2s
impl fmt::Display for AnimationDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_millis() as f64 / 1000.0)
    }
}

/// Values for a card's `{{slot}}` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardContent {
    slots: BTreeMap<String, String>,
}

impl CardContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(mut self, name: &str, value: impl Into<String>) -> Self {
        self.slots.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CardState {
    /// Still showing the loading animation
    Loading,
    Populated(CardContent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardElement {
    index: usize,
    delay: AnimationDelay,
    state: CardState,
}

impl CardElement {
    pub fn new(index: usize, delay: AnimationDelay) -> Self {
        Self {
            index,
            delay,
            state: CardState::Loading,
        }
    }

    /// Position among the clones made from the same template
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn delay(&self) -> AnimationDelay {
        self.delay
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CardState::Loading)
    }

    pub fn content(&self) -> Option<&CardContent> {
        match &self.state {
            CardState::Populated(content) => Some(content),
            CardState::Loading => None,
        }
    }

    /// Fills a loading card. Only the binder calls this, once per clone.
    pub fn populate(self, content: CardContent) -> Self {
        debug_assert!(self.is_loading(), "card {} populated twice", self.index());
        Self {
            state: CardState::Populated(content),
            ..self
        }
    }
}
