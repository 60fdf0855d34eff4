//! Resolution context for card fields.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use buildql::fields::{FaceResolution, FieldValue, TwoFaced};
use buildql::QueryConfig;

use crate::models::{Card, Metadata};

/// Locale whose values are never translated.
pub const DEFAULT_LOCALE: &str = "en";

/// Everything card lookups may consult besides the card.
#[derive(Debug, Clone)]
pub struct CardLookupContext {
    metadata: Arc<Metadata>,
    bonded: HashSet<String>,
    match_backs: bool,
    locale: String,
    translations: HashMap<String, String>,
    deck: Option<HashMap<String, u32>>,
}

impl CardLookupContext {
    /// Creates an English context without cross-face matching.
    pub fn new(metadata: impl Into<Arc<Metadata>>) -> Self {
        let metadata = metadata.into();
        let bonded = metadata.bonded_parents();
        Self {
            metadata,
            bonded,
            match_backs: false,
            locale: DEFAULT_LOCALE.to_string(),
            translations: HashMap::new(),
            deck: None,
        }
    }

    /// Creates a context using the configured locale and cross-face flag.
    pub fn from_config(metadata: impl Into<Arc<Metadata>>, config: &QueryConfig) -> Self {
        Self::new(metadata)
            .with_match_backs(config.match_backs)
            .with_locale(config.locale.clone())
    }

    pub fn with_match_backs(mut self, match_backs: bool) -> Self {
        self.match_backs = match_backs;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets translations keyed like `common.factions.guardian`.
    pub fn with_translations(mut self, translations: HashMap<String, String>) -> Self {
        self.translations = translations;
        self
    }

    /// Sets the deck whose slot quantities `in_deck` reports.
    pub fn with_deck(mut self, slots: HashMap<String, u32>) -> Self {
        self.deck = Some(slots);
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns true if another card is bonded to the card.
    pub fn is_bonded(&self, code: &str) -> bool {
        self.bonded.contains(code)
    }

    /// Quantity of the card in the deck. `None` without a deck.
    pub fn deck_quantity(&self, code: &str) -> Option<u32> {
        self.deck.as_ref()?.get(code).copied()
    }

    /// Translates a key, falling back to the key itself.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.translations.get(key).map_or(key, String::as_str)
    }

    /// Returns true when values need their translations alongside.
    pub fn is_localized(&self) -> bool {
        self.locale != DEFAULT_LOCALE
    }

    /// A code together with its translation under `common.<namespace>`.
    ///
    /// English contexts report the code alone.
    pub fn localized(&self, namespace: &str, code: &str) -> FieldValue {
        if !self.is_localized() {
            return FieldValue::from(code);
        }
        FieldValue::multi([code, self.translate(&format!("common.{namespace}.{code}"))])
    }

    /// Each value followed by its translations under `common.<namespace>`.
    pub fn localized_all(&self, namespace: &str, values: Vec<String>) -> FieldValue {
        if !self.is_localized() {
            return FieldValue::multi(values);
        }
        let translated: Vec<String> = values
            .iter()
            .map(|value| {
                let key = format!("common.{namespace}.{}", value.to_lowercase());
                self.translate(&key).to_string()
            })
            .collect();
        FieldValue::multi(values.into_iter().chain(translated))
    }
}

impl FaceResolution for CardLookupContext {
    fn match_backs(&self) -> bool {
        self.match_backs
    }
}

impl TwoFaced<CardLookupContext> for Card {
    /// The printed back of a double-sided card, or the linked back card.
    fn back_face<'a>(&'a self, context: &'a CardLookupContext) -> Option<Cow<'a, Self>> {
        if self.double_sided {
            return self.double_sided_back().map(Cow::Owned);
        }
        self.back_link_id
            .as_deref()
            .and_then(|code| context.metadata.card(code))
            .map(Cow::Borrowed)
    }
}
