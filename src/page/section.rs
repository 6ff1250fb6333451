// src/page/section.rs
// =============================================================================
// A Section is one load flow's slice of the page: its container of cards, and
// the alert shown instead of the container when the flow fails.
//
// The repo flow and the gist flow each own one Section outright, which is
// why the two can run concurrently without sharing anything.
// =============================================================================

use std::fmt;

use super::card::CardElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Repos,
    Gists,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectionKind::Repos => "pinned repositories",
            SectionKind::Gists => "gists",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    kind: SectionKind,
    cards: Vec<CardElement>,
    hidden: bool,
    alert: Option<String>,
}

impl Section {
    pub fn new(kind: SectionKind, cards: Vec<CardElement>) -> Self {
        Self {
            kind,
            cards,
            hidden: false,
            alert: None,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn cards(&self) -> &[CardElement] {
        &self.cards
    }

    /// Number of cards that received a record
    pub fn populated_count(&self) -> usize {
        self.cards.iter().filter(|card| !card.is_loading()).count()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Message for the section's alert, set when the flow failed
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.alert.is_some()
    }

    /// Hides the container and shows `error` in the alert instead
    pub fn fail(&mut self, error: &impl fmt::Display) {
        self.hidden = true;
        self.alert = Some(error.to_string());
    }

    // The binder takes the cards out, binds them, and puts back the survivors
    pub(super) fn take_cards(&mut self) -> Vec<CardElement> {
        std::mem::take(&mut self.cards)
    }

    pub(super) fn set_cards(&mut self, cards: Vec<CardElement>) {
        self.cards = cards;
    }
}

/// Both sections of the page, as produced by one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSections {
    pub repos: Section,
    pub gists: Section,
}

impl PageSections {
    pub fn any_failed(&self) -> bool {
        self.repos.is_failed() || self.gists.is_failed()
    }
}
