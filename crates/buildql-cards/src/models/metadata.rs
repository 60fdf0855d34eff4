//! Catalog master data: packs, cycles, encounter sets and taboo sets.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::card::Card;

/// A product the cards were printed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub cycle_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

/// A group of packs released together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

/// A set of scenario cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSet {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_code: Option<String>,
}

/// A published list of card errata and restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabooSet {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Everything field lookups may consult besides the card itself.
///
/// Serialized as lists and indexed by code on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub cards: HashMap<String, Card>,
    pub packs: HashMap<String, Pack>,
    pub cycles: HashMap<String, Cycle>,
    pub encounter_sets: HashMap<String, EncounterSet>,
    pub taboo_sets: HashMap<i64, TabooSet>,
}

/// Wire form of [`Metadata`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetadataDocument {
    cards: Vec<Card>,
    packs: Vec<Pack>,
    cycles: Vec<Cycle>,
    encounter_sets: Vec<EncounterSet>,
    taboo_sets: Vec<TabooSet>,
}

impl Metadata {
    /// Parses a catalog document of the form
    /// `{"cards": [..], "packs": [..], "cycles": [..], ..}`.
    ///
    /// Missing sections are empty.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let document: MetadataDocument = serde_json::from_str(json)?;
        let metadata = Self::default()
            .with_cards(document.cards)
            .with_packs(document.packs)
            .with_cycles(document.cycles)
            .with_encounter_sets(document.encounter_sets)
            .with_taboo_sets(document.taboo_sets);

        tracing::debug!(
            cards = metadata.cards.len(),
            packs = metadata.packs.len(),
            "loaded card catalog"
        );
        Ok(metadata)
    }

    pub fn with_cards(mut self, cards: impl IntoIterator<Item = Card>) -> Self {
        self.cards
            .extend(cards.into_iter().map(|card| (card.code.clone(), card)));
        self
    }

    pub fn with_packs(mut self, packs: impl IntoIterator<Item = Pack>) -> Self {
        self.packs
            .extend(packs.into_iter().map(|pack| (pack.code.clone(), pack)));
        self
    }

    pub fn with_cycles(mut self, cycles: impl IntoIterator<Item = Cycle>) -> Self {
        self.cycles
            .extend(cycles.into_iter().map(|cycle| (cycle.code.clone(), cycle)));
        self
    }

    pub fn with_encounter_sets(mut self, sets: impl IntoIterator<Item = EncounterSet>) -> Self {
        self.encounter_sets
            .extend(sets.into_iter().map(|set| (set.code.clone(), set)));
        self
    }

    pub fn with_taboo_sets(mut self, sets: impl IntoIterator<Item = TabooSet>) -> Self {
        self.taboo_sets
            .extend(sets.into_iter().map(|set| (set.id, set)));
        self
    }

    /// Returns the card with the given code.
    pub fn card(&self, code: &str) -> Option<&Card> {
        self.cards.get(code)
    }

    /// Returns the cycle a pack belongs to.
    pub fn cycle_of(&self, pack_code: &str) -> Option<&Cycle> {
        let pack = self.packs.get(pack_code)?;
        self.cycles.get(&pack.cycle_code)
    }

    /// Codes of cards that other cards are bonded to.
    ///
    /// Bonded cards name their parent, so every card whose name matches
    /// some `bonded_to` is a parent.
    pub fn bonded_parents(&self) -> HashSet<String> {
        let names: HashSet<&str> = self
            .cards
            .values()
            .filter_map(|card| card.bonded_to.as_deref())
            .collect();

        self.cards
            .values()
            .filter(|card| {
                names.contains(card.name.as_str())
                    || card.real_name.as_deref().is_some_and(|n| names.contains(n))
            })
            .map(|card| card.code.clone())
            .collect()
    }
}
