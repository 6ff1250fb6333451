// src/page/template.rs
// =============================================================================
// Card templates: the inner markup of a <template> element in the host page.
//
// Templates mark the places to fill with {{slot}} placeholders:
//
//   <div class="card card--async {{state}}" style="animation-delay: {{animation_delay}}">
//     <a class="card-title__link" href="{{url}}">{{name}}</a>
//   </div>
//
// Two slots exist on every card:
// - animation_delay: the staggered delay, e.g. "-1.8s"
// - state: "card--loading" until the card is populated, then empty
//
// Every value is HTML-escaped (quotes included, so attribute slots are safe).
// A slot the card has no value for renders as an empty string.
// =============================================================================

use super::card::{AnimationDelay, CardElement};
use crate::config::AnimationConfig;

/// Class carried by a card that is still waiting for its data
pub const LOADING_CLASS: &str = "card--loading";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    markup: String,
}

/// Delay of the `index`-th card: a decreasing sequence that wraps every
/// `cycle_ms / step_ms` cards, computed in whole milliseconds.
pub fn animation_delay(index: usize, animation: &AnimationConfig) -> AnimationDelay {
    // usize * u64 always fits in u128
    let cycle = u128::from(animation.cycle_ms.max(1));
    let offset = (index as u128 * u128::from(animation.step_ms)) % cycle;
    let millis = i64::try_from(cycle - offset).unwrap_or(i64::MAX);
    AnimationDelay::from_millis(-millis)
}

impl CardTemplate {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Makes `count` detached loading cards, in order
    pub fn instantiate(&self, count: usize, animation: &AnimationConfig) -> Vec<CardElement> {
        (0..count)
            .map(|index| CardElement::new(index, animation_delay(index, animation)))
            .collect()
    }

    /// Renders one card by filling in every placeholder
    pub fn render(&self, card: &CardElement) -> String {
        let mut out = String::with_capacity(self.markup.len());
        let mut rest = self.markup.as_str();

        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..open]);

            let name = rest[open + 2..open + 2 + close].trim();
            out.push_str(&escape_html(&slot_value(card, name)));

            rest = &rest[open + 2 + close + 2..];
        }

        out.push_str(rest);
        out
    }
}

fn slot_value(card: &CardElement, name: &str) -> String {
    match name {
        "animation_delay" => card.delay().to_string(),
        "state" if card.is_loading() => LOADING_CLASS.to_string(),
        "state" => String::new(),
        _ => card
            .content()
            .and_then(|content| content.get(name))
            .unwrap_or_default()
            .to_string(),
    }
}

/// Escapes text for use in element content or a quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
