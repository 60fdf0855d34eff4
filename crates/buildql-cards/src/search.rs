//! Searching a card catalog with field queries.

use std::sync::Arc;

use buildql::{QueryConfig, QueryEngine};

use crate::context::CardLookupContext;
use crate::error::Result;
use crate::fields::card_fields;
use crate::models::{Card, Metadata};

/// A card catalog paired with a query engine over the standard card fields.
#[derive(Debug)]
pub struct CardSearch {
    engine: QueryEngine<Card, CardLookupContext>,
    context: CardLookupContext,
    cards: Vec<Card>,
}

impl CardSearch {
    /// Creates a search over the catalog with the default configuration.
    pub fn new(metadata: impl Into<Arc<Metadata>>) -> Result<Self> {
        Self::with_config(metadata, QueryConfig::default())
    }

    /// Creates a search over the catalog with the given configuration.
    pub fn with_config(metadata: impl Into<Arc<Metadata>>, config: QueryConfig) -> Result<Self> {
        let context = CardLookupContext::from_config(metadata, &config);

        let mut cards: Vec<Card> = context.metadata().cards.values().cloned().collect();
        cards.sort_by(|a, b| a.code.cmp(&b.code));

        let engine = QueryEngine::with_config(card_fields()?, config);
        Ok(Self {
            engine,
            context,
            cards,
        })
    }

    /// Parses a catalog document and loads the configuration from its
    /// default location.
    pub fn load(catalog_json: &str) -> Result<Self> {
        let metadata = Metadata::from_json(catalog_json)?;
        Self::with_config(metadata, QueryConfig::load()?)
    }

    /// Replaces the lookup context, e.g. to set a deck or translations.
    pub fn with_context(mut self, context: CardLookupContext) -> Self {
        self.context = context;
        self
    }

    /// Returns the cards matching the query, ordered by code.
    ///
    /// Linked back cards are catalog entries too and are searched like any
    /// other card.
    pub fn search(&self, query: &str) -> Result<Vec<&Card>> {
        let predicate = self.engine.compile(query, &self.context)?;
        let matched = predicate.filter(&self.cards)?;
        tracing::debug!(query, matched = matched.len(), "searched cards");
        Ok(matched)
    }

    /// Returns true if the card matches the query.
    pub fn matches(&self, query: &str, card: &Card) -> Result<bool> {
        Ok(self.engine.compile(query, &self.context)?.matches(card)?)
    }

    pub fn engine(&self) -> &QueryEngine<Card, CardLookupContext> {
        &self.engine
    }

    pub fn context(&self) -> &CardLookupContext {
        &self.context
    }
}
