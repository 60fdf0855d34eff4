//! Investigator deckbuilding access.
//!
//! Decides whether an investigator may include a card in their deck, from
//! the investigator's deck options and the card's restrictions.

use crate::models::{Card, DeckOption};

/// Returns true if `investigator` may include `card` in a deck.
///
/// Signature cards and weaknesses restricted to the investigator are always
/// accessible; cards restricted to someone else never are. Other player
/// cards need a matching deck option and no matching `not` option.
/// Customizable cards ignore level limits.
pub fn has_access(investigator: &Card, card: &Card) -> bool {
    if !investigator.is_investigator() {
        return false;
    }

    if has_weakness_access(investigator, card) {
        return true;
    }

    if card.is_investigator() || card.is_encounter_card() || card.is_restricted() {
        return false;
    }

    let (excluding, including): (Vec<&DeckOption>, Vec<&DeckOption>) =
        investigator.deck_options.iter().partition(|option| option.not);

    including.iter().any(|option| option_admits(option, card))
        && !excluding.iter().any(|option| option_admits(option, card))
}

/// Returns true for cards restricted to the investigator, and for basic
/// weaknesses that anyone may draw.
pub fn has_weakness_access(investigator: &Card, card: &Card) -> bool {
    if card.is_restricted_to(&investigator.code) {
        return true;
    }
    card.subtype_code.as_deref() == Some("basicweakness") && !card.is_restricted()
}

fn option_admits(option: &DeckOption, card: &Card) -> bool {
    if !option.faction.is_empty()
        && !card
            .factions()
            .any(|faction| option.faction.iter().any(|f| f == faction))
    {
        return false;
    }

    if let Some(level) = option.level {
        if !card.is_customizable() && !level.contains(card.xp.unwrap_or(0)) {
            return false;
        }
    }

    if !option.traits.is_empty() && !option.traits.iter().any(|t| card.has_trait(t)) {
        return false;
    }

    if !option.types.is_empty() && !option.types.contains(&card.type_code) {
        return false;
    }

    true
}
