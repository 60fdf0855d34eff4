//! Card model.
//!
//! This module defines the Card struct as published in the card catalog,
//! along with the deckbuilding types investigators carry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A card from the catalog.
///
/// Display attributes (`name`, `text`, `traits` ...) hold the localized
/// value; the `real_*` counterparts hold the English original when the
/// catalog is translated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The unique card code, e.g. `"01001"`.
    pub code: String,

    /// The display name.
    pub name: String,

    /// The English name, when `name` is a translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,

    /// The display subname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subname: Option<String>,

    /// Rules text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Flavor text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,

    /// Dot-separated traits, e.g. `"Item. Weapon. Firearm."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<String>,

    /// Primary faction code.
    #[serde(default)]
    pub faction_code: String,

    /// Second faction of multiclass cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction2_code: Option<String>,

    /// Third faction of multiclass cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction3_code: Option<String>,

    /// Card type code, e.g. `"asset"` or `"investigator"`.
    #[serde(default)]
    pub type_code: String,

    /// Subtype code, e.g. `"weakness"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype_code: Option<String>,

    /// Code of the pack the card was printed in.
    #[serde(default)]
    pub pack_code: String,

    /// Code of the encounter set, for scenario cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_code: Option<String>,

    /// Copies per pack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    /// Experience level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i64>,

    /// Resource cost. `-2` stands for X.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_willpower: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_intellect: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_combat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_agility: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_wild: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanity: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_damage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_horror: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_fight: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_evade: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clues: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doom: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shroud: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victory: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vengeance: Option<i64>,

    /// Maximum copies allowed in a deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustrator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptional: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exile: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub myriad: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,

    /// Upgrade options of customizable cards. Only presence matters here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization_options: Option<serde_json::Value>,

    /// Dot-separated search tags, e.g. `"hd.hh."` for healing cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// Dot-separated slots, e.g. `"Hand x2."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_slot: Option<String>,

    /// Name of the card this card is bonded to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonded_to: Option<String>,

    /// Id of the taboo set this entry belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taboo_set_id: Option<i64>,

    /// Whether the card has its own printed back face.
    #[serde(default)]
    pub double_sided: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_flavor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_traits: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_illustrator: Option<String>,

    /// Code of a separate catalog card printed on the back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_link_id: Option<String>,

    /// Deckbuilding options of investigators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deck_options: Vec<DeckOption>,

    /// Deckbuilding restrictions, e.g. signature cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Restrictions>,
}

/// One deckbuilding option of an investigator.
///
/// An option admits a card when every criterion it sets is met. Options with
/// `not` set exclude the cards they match instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckOption {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faction: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelRange>,

    #[serde(default, rename = "trait", skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not: bool,
}

/// Inclusive experience range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: i64,
    pub max: i64,
}

impl LevelRange {
    /// Returns true if `xp` lies within the range.
    pub fn contains(&self, xp: i64) -> bool {
        (self.min..=self.max).contains(&xp)
    }
}

/// Deckbuilding restrictions of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions {
    /// Investigators the card is restricted to, keyed by investigator code.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub investigator: HashMap<String, String>,
}

/// Splits a dot-separated attribute such as traits or slots.
///
/// `"Item. Weapon. Firearm."` becomes `["Item", "Weapon", "Firearm"]`.
pub fn split_multi_value(value: &str) -> Vec<String> {
    value
        .split('.')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

impl Card {
    /// Creates a card with the given code and name and everything else unset.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns true for investigator cards.
    pub fn is_investigator(&self) -> bool {
        self.type_code == "investigator"
    }

    /// Returns true for cards that belong to an encounter set.
    pub fn is_encounter_card(&self) -> bool {
        self.encounter_code.is_some()
    }

    /// Returns true if the card carries the trait, ignoring case.
    pub fn has_trait(&self, name: &str) -> bool {
        self.trait_list()
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name))
    }

    /// The card's traits.
    pub fn trait_list(&self) -> Vec<String> {
        self.traits.as_deref().map(split_multi_value).unwrap_or_default()
    }

    /// Returns true if the card has the search tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| split_multi_value(tags).iter().any(|t| t == tag))
    }

    /// Faction codes in printed order.
    pub fn factions(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.faction_code.as_str())
            .chain(self.faction2_code.as_deref())
            .chain(self.faction3_code.as_deref())
            .filter(|code| !code.is_empty())
    }

    /// Returns true for cards of more than one faction.
    pub fn is_multiclass(&self) -> bool {
        self.faction2_code.is_some() || self.faction3_code.is_some()
    }

    /// Returns true for customizable cards.
    pub fn is_customizable(&self) -> bool {
        self.customization_options.is_some()
    }

    /// Returns true for specialist cards, recognised by their trait.
    pub fn is_specialist(&self) -> bool {
        self.has_trait("Specialist")
    }

    /// Returns true if the card is restricted to the given investigator.
    pub fn is_restricted_to(&self, investigator_code: &str) -> bool {
        self.restrictions
            .as_ref()
            .is_some_and(|r| r.investigator.contains_key(investigator_code))
    }

    /// Returns true if the card is restricted to any investigator.
    pub fn is_restricted(&self) -> bool {
        self.restrictions
            .as_ref()
            .is_some_and(|r| !r.investigator.is_empty())
    }

    /// Returns true for weaknesses of any kind.
    pub fn is_weakness(&self) -> bool {
        matches!(
            self.subtype_code.as_deref(),
            Some("weakness" | "basicweakness")
        )
    }

    /// The generic back printed on single-faced cards.
    ///
    /// `None` for cards with a face of their own on the back.
    pub fn back_type(&self) -> Option<&'static str> {
        if self.double_sided || self.back_link_id.is_some() {
            None
        } else if self.is_encounter_card() {
            Some("encounter")
        } else {
            Some("player")
        }
    }

    /// Builds the back face of a double-sided card from its `back_*` attributes.
    ///
    /// Attributes the back does not print fall back to the front's values.
    /// Returns `None` for cards without a printed back.
    pub fn double_sided_back(&self) -> Option<Card> {
        if !self.double_sided {
            return None;
        }

        Some(Card {
            code: format!("{}b", self.code),
            name: self.back_name.clone().unwrap_or_else(|| self.name.clone()),
            real_name: None,
            subname: None,
            text: self.back_text.clone(),
            flavor: self.back_flavor.clone(),
            traits: self.back_traits.clone(),
            illustrator: self
                .back_illustrator
                .clone()
                .or_else(|| self.illustrator.clone()),
            double_sided: false,
            back_name: None,
            back_text: None,
            back_flavor: None,
            back_traits: None,
            back_illustrator: None,
            back_link_id: None,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserialize_minimal() {
        let json = r#"{
            "code": "01006",
            "name": "Roland's .38 Special"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.code, "01006");
        assert_eq!(card.name, "Roland's .38 Special");
        assert!(card.xp.is_none());
        assert!(!card.double_sided);
        assert!(card.deck_options.is_empty());
    }

    #[test]
    fn test_card_deserialize_investigator() {
        let json = r#"{
            "code": "01001",
            "name": "Roland Banks",
            "subname": "The Fed",
            "type_code": "investigator",
            "faction_code": "guardian",
            "pack_code": "core",
            "health": 9,
            "sanity": 5,
            "traits": "Agency. Detective.",
            "double_sided": true,
            "back_text": "Deck Size: 30.",
            "deck_options": [
                {"faction": ["guardian", "neutral"], "level": {"min": 0, "max": 5}},
                {"faction": ["seeker"], "level": {"min": 0, "max": 2}}
            ]
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.is_investigator());
        assert_eq!(card.health, Some(9));
        assert_eq!(card.trait_list(), ["Agency", "Detective"]);
        assert_eq!(card.deck_options.len(), 2);
        assert_eq!(
            card.deck_options[1].level,
            Some(LevelRange { min: 0, max: 2 })
        );
    }

    #[test]
    fn test_deck_option_renamed_fields() {
        let json = r#"{"trait": ["Spell"], "type": ["asset"], "not": true}"#;
        let option: DeckOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.traits, ["Spell"]);
        assert_eq!(option.types, ["asset"]);
        assert!(option.not);
    }

    #[test]
    fn test_card_serialize_skips_unset() {
        let card = Card::new("01006", "Roland's .38 Special");
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("xp"));
        assert!(!json.contains("restrictions"));
        assert!(json.contains("\"code\":\"01006\""));
    }

    #[test]
    fn test_split_multi_value() {
        assert_eq!(split_multi_value("Item. Weapon. Firearm."), ["Item", "Weapon", "Firearm"]);
        assert_eq!(split_multi_value("Hand x2."), ["Hand x2"]);
        assert!(split_multi_value("").is_empty());
    }

    #[test]
    fn test_factions_and_multiclass() {
        let mut card = Card::new("60001", "Lucky Cigarette Case");
        card.faction_code = "rogue".to_string();
        assert_eq!(card.factions().collect::<Vec<_>>(), ["rogue"]);
        assert!(!card.is_multiclass());

        card.faction2_code = Some("survivor".to_string());
        assert_eq!(card.factions().collect::<Vec<_>>(), ["rogue", "survivor"]);
        assert!(card.is_multiclass());
    }

    #[test]
    fn test_has_tag() {
        let mut card = Card::new("01088", "Emergency Cache");
        assert!(!card.has_tag("hd"));
        card.tags = Some("hd.hh.".to_string());
        assert!(card.has_tag("hd"));
        assert!(card.has_tag("hh"));
        assert!(!card.has_tag("h"));
    }

    #[test]
    fn test_back_type() {
        let mut card = Card::new("01006", "Roland's .38 Special");
        assert_eq!(card.back_type(), Some("player"));

        card.encounter_code = Some("torch".to_string());
        assert_eq!(card.back_type(), Some("encounter"));

        card.double_sided = true;
        assert_eq!(card.back_type(), None);
    }

    #[test]
    fn test_double_sided_back() {
        let mut card = Card::new("01001", "Roland Banks");
        card.illustrator = Some("Magali Villeneuve".to_string());
        card.health = Some(9);
        assert!(card.double_sided_back().is_none());

        card.double_sided = true;
        card.back_text = Some("Deck Size: 30.".to_string());
        card.back_flavor = Some("Roland was a straight arrow.".to_string());

        let back = card.double_sided_back().unwrap();
        assert_eq!(back.code, "01001b");
        assert_eq!(back.name, "Roland Banks");
        assert_eq!(back.text.as_deref(), Some("Deck Size: 30."));
        assert_eq!(back.illustrator.as_deref(), Some("Magali Villeneuve"));
        assert_eq!(back.health, Some(9));
        assert!(!back.double_sided);
        assert!(back.back_text.is_none());
    }

    #[test]
    fn test_restrictions() {
        let json = r#"{
            "code": "01006",
            "name": "Roland's .38 Special",
            "restrictions": {"investigator": {"01001": "01001"}}
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.is_restricted());
        assert!(card.is_restricted_to("01001"));
        assert!(!card.is_restricted_to("01002"));
    }
}
