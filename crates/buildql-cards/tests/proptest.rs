//! Property-based tests for the card fields using proptest.

use buildql_cards::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

fn search() -> CardSearch {
    let mut daisy = Card::new("01002", "Daisy Walker");
    daisy.type_code = "investigator".to_string();
    daisy.faction_code = "seeker".to_string();
    daisy.deck_options = vec![
        DeckOption {
            faction: vec!["seeker".to_string(), "neutral".to_string()],
            level: Some(LevelRange { min: 0, max: 5 }),
            ..Default::default()
        },
        DeckOption {
            faction: vec!["mystic".to_string()],
            level: Some(LevelRange { min: 0, max: 2 }),
            ..Default::default()
        },
    ];
    CardSearch::new(Metadata::default().with_cards([daisy])).unwrap()
}

const FACTIONS: [&str; 6] = ["guardian", "seeker", "rogue", "mystic", "survivor", "neutral"];

fn card_strategy() -> impl Strategy<Value = Card> {
    (
        0usize..FACTIONS.len(),
        prop::option::of(0i64..6),
        prop::option::of(-2i64..7),
        0i64..6,
    )
        .prop_map(|(faction, xp, cost, willpower)| {
            let mut card = Card::new("90001", "Generated Card");
            card.type_code = "asset".to_string();
            card.faction_code = FACTIONS[faction].to_string();
            card.xp = xp;
            card.cost = cost;
            card.skill_willpower = Some(willpower);
            card
        })
}

// ============================================================================
// Field properties
// ============================================================================

proptest! {
    /// Aliases and legacy aliases resolve exactly like the canonical name.
    #[test]
    fn aliases_agree_with_canonical_names(card in card_strategy(), value in 0i64..6) {
        let search = search();
        let canonical = search.matches(&format!("willpower >= {value}"), &card).unwrap();
        for alias in ["wp", "will", "brain", "w"] {
            let query = format!("{alias} >= {value}");
            prop_assert_eq!(search.matches(&query, &card).unwrap(), canonical);
        }
    }

    /// A comparison-dependent field resolves the same from either side.
    #[test]
    fn investigator_access_is_symmetric(card in card_strategy()) {
        let search = search();
        prop_assert_eq!(
            search.matches("investigator_access = \"01002\"", &card).unwrap(),
            search.matches("\"01002\" = investigator_access", &card).unwrap()
        );
    }

    /// Access follows the investigator's faction and level limits.
    #[test]
    fn investigator_access_follows_deck_options(card in card_strategy()) {
        let search = search();
        let level = card.xp.unwrap_or(0);
        let expected = match card.faction_code.as_str() {
            "seeker" | "neutral" => true,
            "mystic" => level <= 2,
            _ => false,
        };
        prop_assert_eq!(search.matches("ia = \"01002\"", &card).unwrap(), expected);
    }

    /// `!==` is the exact negation of `==` on single-valued fields.
    #[test]
    fn strict_not_equals_negates_equals(card in card_strategy(), value in -2i64..7) {
        let search = search();
        prop_assert_ne!(
            search.matches(&format!("cost == {value}"), &card).unwrap(),
            search.matches(&format!("cost !== {value}"), &card).unwrap()
        );
    }
}
