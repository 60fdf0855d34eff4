//! The standard card fields.
//!
//! Every field has a canonical name, a few short aliases and, for fields
//! that predate the current syntax, a single-letter legacy alias. Fields
//! built with [`face_aware`] report both faces when the context asks for
//! cross-face matching; the rest describe the card as a whole.

use buildql::fields::{
    face_aware, face_independent, ComparisonContext, FieldDefinition, FieldRegistry, FieldType,
    FieldValue, Operand,
};
use buildql::QueryResult;

use crate::access::has_access;
use crate::context::CardLookupContext;
use crate::models::{split_multi_value, Card};

type Ctx = CardLookupContext;
type Definition = FieldDefinition<Card, Ctx>;

/// Builds the registry of all card fields.
///
/// # Errors
///
/// Returns `QueryError::DuplicateField` if two definitions share a name.
pub fn card_fields() -> QueryResult<FieldRegistry<Card, Ctx>> {
    card_field_definitions()
        .into_iter()
        .fold(FieldRegistry::builder(), |builder, definition| {
            builder.field(definition)
        })
        .build()
}

/// Definitions of every card field.
pub fn card_field_definitions() -> Vec<Definition> {
    vec![
        number("agility", |card| card.skill_agility.unwrap_or(0))
            .aliases(["ag", "foot"])
            .legacy_alias("a"),
        FieldDefinition::new(
            "bonded",
            FieldType::Boolean,
            face_aware(|card: &Card, ctx: &Ctx| ctx.is_bonded(&card.code).into()),
        )
        .aliases(["bo"]),
        optional_number("clues", |card| card.clues).aliases(["cl"]),
        number("combat", |card| card.skill_combat.unwrap_or(0))
            .aliases(["cb", "fist"])
            .legacy_alias("c"),
        optional_number("cost", |card| card.cost)
            .aliases(["co"])
            .legacy_alias("o"),
        FieldDefinition::new(
            "customizable",
            FieldType::Boolean,
            face_independent(|card: &Card, _: &Ctx, _| card.is_customizable().into()),
        )
        .aliases(["cus"]),
        FieldDefinition::new(
            "cycle",
            FieldType::String,
            face_independent(|card: &Card, ctx: &Ctx, _| {
                let Some(pack) = ctx.metadata().packs.get(&card.pack_code) else {
                    return FieldValue::Null;
                };
                match ctx.metadata().cycles.get(&pack.cycle_code) {
                    Some(cycle) => {
                        FieldValue::multi([pack.cycle_code.as_str(), cycle.name.as_str()])
                    }
                    None => FieldValue::Null,
                }
            }),
        )
        .aliases(["cy"])
        .legacy_alias("y"),
        optional_number("damage", |card| card.enemy_damage).aliases(["dmg"]),
        optional_number("deck_limit", |card| card.deck_limit).aliases(["dl", "limit"]),
        optional_number("doom", |card| card.doom).aliases(["do"]),
        FieldDefinition::new(
            "encounter_set",
            FieldType::String,
            face_independent(|card: &Card, ctx: &Ctx, _| {
                card.encounter_code
                    .as_deref()
                    .and_then(|code| {
                        let set = ctx.metadata().encounter_sets.get(code)?;
                        Some(FieldValue::multi([code, set.name.as_str()]))
                    })
                    .unwrap_or_default()
            }),
        )
        .aliases(["en", "encounter", "set"]),
        optional_number("evade", |card| card.enemy_evade).aliases(["ev"]),
        flag("exceptional", |card| card.exceptional.unwrap_or(false)).aliases(["ex"]),
        FieldDefinition::new(
            "exile",
            FieldType::Boolean,
            face_independent(|card: &Card, _: &Ctx, _| card.exile.unwrap_or(false).into()),
        )
        .aliases(["exl"]),
        FieldDefinition::new(
            "faction",
            FieldType::String,
            face_aware(|card: &Card, ctx: &Ctx| {
                ctx.localized_all("factions", card.factions().map(str::to_string).collect())
            }),
        )
        .aliases(["cls", "class"])
        .legacy_alias("f"),
        optional_number("fight", |card| card.enemy_fight).aliases(["fi"]),
        text("flavor", |card| card.flavor.as_deref())
            .aliases(["fl"])
            .legacy_alias("v"),
        flag("heals_damage", |card| card.has_tag("hd")).aliases(["hd"]),
        flag("heals_horror", |card| card.has_tag("hh")).aliases(["hh"]),
        optional_number("health", |card| card.health)
            .aliases(["hp"])
            .legacy_alias("h"),
        optional_number("horror", |card| card.enemy_horror).aliases(["ho"]),
        string("id", |card| Some(card.code.as_str())).aliases(["code"]),
        string("illustrator", |card| card.illustrator.as_deref())
            .aliases(["il", "illu", "artist"])
            .legacy_alias("l"),
        number("intellect", |card| card.skill_intellect.unwrap_or(0))
            .aliases(["in", "int", "book"])
            .legacy_alias("i"),
        FieldDefinition::new(
            "investigator_access",
            FieldType::String,
            face_independent(investigator_access),
        )
        .aliases(["ia"]),
        FieldDefinition::new(
            "in_deck",
            FieldType::Number,
            face_independent(|card: &Card, ctx: &Ctx, _| ctx.deck_quantity(&card.code).into()),
        ),
        optional_number("xp", |card| card.xp)
            .aliases(["level", "lvl"])
            .legacy_alias("p"),
        flag("multiclass", Card::is_multiclass).aliases(["mu", "multi"]),
        FieldDefinition::new(
            "myriad",
            FieldType::Boolean,
            face_independent(|card: &Card, _: &Ctx, _| card.myriad.unwrap_or(false).into()),
        )
        .aliases(["my"]),
        string("name", |card| Some(card.name.as_str())).aliases(["na"]),
        FieldDefinition::new(
            "pack",
            FieldType::String,
            face_independent(|card: &Card, ctx: &Ctx, _| {
                match ctx.metadata().packs.get(&card.pack_code) {
                    Some(pack) => {
                        FieldValue::multi([card.pack_code.as_str(), pack.name.as_str()])
                    }
                    None => FieldValue::Null,
                }
            }),
        )
        .aliases(["pa"])
        .legacy_alias("e"),
        flag("permanent", |card| card.permanent.unwrap_or(false)).aliases(["pe", "perm"]),
        optional_number("quantity", |card| card.quantity).aliases(["qt", "qty"]),
        FieldDefinition::new(
            "reverse_type",
            FieldType::String,
            face_independent(|card: &Card, _: &Ctx, _| card.back_type().into()),
        )
        .aliases(["rt"]),
        optional_number("sanity", |card| card.sanity)
            .aliases(["sa"])
            .legacy_alias("s"),
        optional_number("shroud", |card| card.shroud).aliases(["sh"]),
        FieldDefinition::new(
            "slot",
            FieldType::String,
            face_aware(|card: &Card, ctx: &Ctx| match card.real_slot.as_deref() {
                Some(slots) => ctx.localized_all("slot", split_multi_value(slots)),
                None => FieldValue::Null,
            }),
        )
        .aliases(["sl"])
        .legacy_alias("z"),
        flag("specialist", Card::is_specialist).aliases(["sp"]),
        string("subname", |card| card.subname.as_deref()).aliases(["sn"]),
        optional_number("stage", |card| card.stage).aliases(["sg"]),
        FieldDefinition::new(
            "subtype",
            FieldType::String,
            face_aware(|card: &Card, ctx: &Ctx| match card.subtype_code.as_deref() {
                Some(code) => ctx.localized("subtype", code),
                None => FieldValue::Null,
            }),
        )
        .aliases(["st"])
        .legacy_alias("b"),
        FieldDefinition::new(
            "taboo_set",
            FieldType::String,
            face_independent(|card: &Card, ctx: &Ctx, _| {
                card.taboo_set_id
                    .and_then(|id| ctx.metadata().taboo_sets.get(&id))
                    .map(|taboo| taboo.name.as_str())
                    .into()
            }),
        )
        .aliases(["ts"]),
        text("text", |card| card.text.as_deref())
            .aliases(["txt"])
            .legacy_alias("x"),
        FieldDefinition::new(
            "trait",
            FieldType::String,
            face_aware(|card: &Card, ctx: &Ctx| match card.traits.as_deref() {
                Some(traits) => ctx.localized_all("traits", split_multi_value(traits)),
                None => FieldValue::Null,
            }),
        )
        .aliases(["tr"])
        .legacy_alias("k"),
        FieldDefinition::new(
            "type",
            FieldType::String,
            face_aware(|card: &Card, ctx: &Ctx| ctx.localized("type", &card.type_code)),
        )
        .aliases(["ty"])
        .legacy_alias("t"),
        flag("unique", |card| card.is_unique.unwrap_or(false))
            .aliases(["un"])
            .legacy_alias("u"),
        optional_number("vengeance", |card| card.vengeance).aliases(["ve"]),
        optional_number("victory", |card| card.victory)
            .aliases(["vp"])
            .legacy_alias("j"),
        number("wild", |card| card.skill_wild.unwrap_or(0))
            .aliases(["wd"])
            .legacy_alias("d"),
        number("willpower", |card| card.skill_willpower.unwrap_or(0))
            .aliases(["wp", "will", "brain"])
            .legacy_alias("w"),
    ]
}

// ==================== Face-aware shorthands ====================

fn number(name: &str, get: fn(&Card) -> i64) -> Definition {
    FieldDefinition::new(
        name,
        FieldType::Number,
        face_aware(move |card: &Card, _: &Ctx| get(card).into()),
    )
}

fn optional_number(name: &str, get: fn(&Card) -> Option<i64>) -> Definition {
    FieldDefinition::new(
        name,
        FieldType::Number,
        face_aware(move |card: &Card, _: &Ctx| get(card).into()),
    )
}

fn flag(name: &str, get: fn(&Card) -> bool) -> Definition {
    FieldDefinition::new(
        name,
        FieldType::Boolean,
        face_aware(move |card: &Card, _: &Ctx| get(card).into()),
    )
}

fn string(name: &str, get: fn(&Card) -> Option<&str>) -> Definition {
    FieldDefinition::new(
        name,
        FieldType::String,
        face_aware(move |card: &Card, _: &Ctx| get(card).into()),
    )
}

fn text(name: &str, get: fn(&Card) -> Option<&str>) -> Definition {
    FieldDefinition::new(
        name,
        FieldType::Text,
        face_aware(move |card: &Card, _: &Ctx| get(card).into()),
    )
}

// ==================== Comparison-dependent fields ====================

/// Resolves to the compared investigator codes the card is accessible to.
///
/// The field has no value of its own: compared against `"01001"` it yields
/// `"01001"` when Roland Banks may take the card, and null otherwise. Without
/// a comparison, or against anything but investigator codes, it is `false`.
///
/// Only `ia` abbreviates this field. The older short form `do` belongs to
/// `doom`.
fn investigator_access(
    card: &Card,
    ctx: &Ctx,
    comparison: Option<&ComparisonContext<'_>>,
) -> FieldValue {
    let codes: Vec<&str> = match comparison.map(|c| c.other) {
        Some(Operand::Value(FieldValue::String(code))) => vec![code.as_str()],
        Some(Operand::List(items)) => items.iter().filter_map(Operand::as_str).collect(),
        _ => return FieldValue::Bool(false),
    };

    let investigators: Vec<&Card> = codes
        .iter()
        .filter_map(|code| ctx.metadata().card(code))
        .filter(|candidate| candidate.is_investigator())
        .collect();
    if investigators.is_empty() {
        return FieldValue::Bool(false);
    }

    let accessible: Vec<&str> = investigators
        .into_iter()
        .filter(|investigator| has_access(investigator, card))
        .map(|investigator| investigator.code.as_str())
        .collect();

    match accessible.as_slice() {
        [] => FieldValue::Null,
        [code] => FieldValue::from(*code),
        codes => FieldValue::multi(codes.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildql::fields::BACK_PREFIX;

    #[test]
    fn test_registry_builds_without_duplicates() {
        let registry = card_fields().unwrap();
        assert_eq!(registry.field_names().len(), card_field_definitions().len());
        assert_eq!(registry.field_names().first().map(String::as_str), Some("agility"));
    }

    #[test]
    fn test_aliases_resolve_to_canonical_names() {
        let registry = card_fields().unwrap();
        for (alias, canonical) in [
            ("ag", "agility"),
            ("a", "agility"),
            ("cls", "faction"),
            ("f", "faction"),
            ("code", "id"),
            ("lvl", "xp"),
            ("p", "xp"),
            ("do", "doom"),
            ("ia", "investigator_access"),
            ("brain", "willpower"),
            ("tr", "trait"),
            ("k", "trait"),
        ] {
            assert_eq!(registry.resolve(alias).unwrap().name(), canonical, "{alias}");
        }
    }

    #[test]
    fn test_back_variants_exist_for_aliases_only() {
        let registry = card_fields().unwrap();
        assert_eq!(
            registry.resolve("back:na").unwrap().name(),
            format!("{BACK_PREFIX}name")
        );
        assert!(registry.contains("back:trait"));
        assert!(!registry.contains("back:k"));
    }

    #[test]
    fn test_declared_types() {
        let registry = card_fields().unwrap();
        let type_of = |name: &str| registry.resolve(name).unwrap().field_type();
        assert_eq!(type_of("text"), FieldType::Text);
        assert_eq!(type_of("flavor"), FieldType::Text);
        assert_eq!(type_of("name"), FieldType::String);
        assert_eq!(type_of("cost"), FieldType::Number);
        assert_eq!(type_of("unique"), FieldType::Boolean);
        assert_eq!(type_of("in_deck"), FieldType::Number);
    }
}
