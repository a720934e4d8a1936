//! Reads tier availability out of a creator page.
//!
//! Each tier on the page has a checkout control,
//! `<a data-tag="patron-checkout-continue-button" aria-label="Gold Join">`,
//! whose label carries the tier name followed by an action word, and
//! whose visible text is "Join" or "Sold Out".

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use tierwatch_core::{Tier, TierStatus};

use crate::error::ExtractError;

/// CSS selector for the per-tier checkout control.
pub const CHECKOUT_BUTTON_SELECTOR: &str = r#"a[data-tag="patron-checkout-continue-button"]"#;

const TEXT_SOLD_OUT: &str = "Sold Out";
const TEXT_JOIN: &str = "Join";

/// Turns page markup into the list of tiers it advertises.
pub trait TierExtractor: Send + Sync {
    /// An empty list means "no tiers on this page", not an error.
    fn extract(&self, markup: &str) -> Result<Vec<Tier>, ExtractError>;
}

#[derive(Debug, Clone)]
pub struct PatreonTierExtractor {
    selector: Selector,
}

impl PatreonTierExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_selector(CHECKOUT_BUTTON_SELECTOR)
    }

    /// Use a different control selector, for when the site's markup moves.
    pub fn with_selector(css: &str) -> Result<Self, ExtractError> {
        let selector = Selector::parse(css).map_err(|e| ExtractError::Selector(e.to_string()))?;
        Ok(Self { selector })
    }
}

impl TierExtractor for PatreonTierExtractor {
    fn extract(&self, markup: &str) -> Result<Vec<Tier>, ExtractError> {
        if markup.trim().is_empty() {
            return Err(ExtractError::Malformed("empty document".into()));
        }
        if markup.contains('\0') {
            return Err(ExtractError::Malformed("document contains NUL bytes".into()));
        }

        let document = Html::parse_document(markup);
        let mut tiers = Vec::new();

        for control in document.select(&self.selector) {
            let Some(name) = tier_name(&control) else {
                debug!("checkout control without a usable aria-label, skipping");
                continue;
            };
            let status = classify(is_disabled(&control), &control_text(&control));
            tiers.push(Tier::new(name, status));
        }

        debug!(tiers = tiers.len(), "tiers extracted");
        Ok(tiers)
    }
}

/// Status policy, in priority order: disabled or "Sold Out" beats "Join";
/// anything else is unknown and never counts as available.
pub fn classify(disabled: bool, text: &str) -> TierStatus {
    if disabled || text == TEXT_SOLD_OUT {
        TierStatus::SoldOut
    } else if text == TEXT_JOIN {
        TierStatus::Available
    } else {
        TierStatus::Unknown
    }
}

/// All label words except the trailing action word.
fn tier_name(control: &ElementRef<'_>) -> Option<String> {
    let label = control.value().attr("aria-label")?;
    let words: Vec<&str> = label.split_whitespace().collect();
    let (_action, name_words) = words.split_last()?;
    let name = name_words.join(" ");
    (!name.is_empty()).then_some(name)
}

fn is_disabled(control: &ElementRef<'_>) -> bool {
    let el = control.value();
    el.attr("aria-disabled") == Some("true") || el.attr("disabled").is_some()
}

/// Direct child text nodes and direct child elements' text, each trimmed.
fn control_text(control: &ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in control.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t.trim()),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    text.push_str(el.text().collect::<String>().trim());
                }
            }
            _ => {}
        }
    }
    text
}
