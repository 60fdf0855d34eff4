//! The field registry: query-visible names mapped to typed lookups.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strsim::levenshtein;

use crate::error::{QueryError, QueryResult};

use super::value::{ComparisonContext, FieldType, FieldValue};

/// Prefix of the variant of every field that reads the back face only.
pub const BACK_PREFIX: &str = "back:";

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Resolves a field's value for one record.
pub type LookupFn<R, C> =
    Arc<dyn Fn(&R, &C, Option<&ComparisonContext<'_>>) -> FieldValue + Send + Sync>;

/// Wraps a closure as a [`LookupFn`].
pub fn lookup_fn<R, C, F>(f: F) -> LookupFn<R, C>
where
    F: Fn(&R, &C, Option<&ComparisonContext<'_>>) -> FieldValue + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Which face a lookup should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// The primary face, or both faces when cross-face matching is on.
    Front,
    /// Only the back face (`back:` fields).
    Back,
}

/// Resolution contexts that can request cross-face matching.
pub trait FaceResolution {
    /// Whether base fields should report the values of both faces.
    fn match_backs(&self) -> bool;
}

/// Records that may have a second face.
pub trait TwoFaced<C>: Clone {
    /// Returns the back face of the record, if it has one.
    fn back_face<'a>(&'a self, context: &'a C) -> Option<Cow<'a, Self>>;
}

/// Builds a lookup factory that honors faces.
///
/// The `Front` lookup returns the front value, or a
/// [`FieldValue::DualFace`] of both faces when the context requests
/// cross-face matching and the record has a back. The `Back` lookup always
/// returns the back value. Single-faced records have an empty back, so
/// `back:` fields resolve against `R::default()`.
pub fn face_aware<R, C, F>(resolver: F) -> impl Fn(Face) -> LookupFn<R, C> + 'static
where
    R: TwoFaced<C> + Default + 'static,
    C: FaceResolution + 'static,
    F: Fn(&R, &C) -> FieldValue + Send + Sync + 'static,
{
    let resolver = Arc::new(resolver);
    move |face| {
        let resolver = Arc::clone(&resolver);
        match face {
            Face::Back => lookup_fn(move |record: &R, ctx: &C, _| match record.back_face(ctx) {
                Some(back) => resolver(&*back, ctx),
                None => resolver(&R::default(), ctx),
            }),
            Face::Front => lookup_fn(move |record: &R, ctx: &C, _| {
                let front = resolver(record, ctx);
                if !ctx.match_backs() {
                    return front;
                }
                match record.back_face(ctx) {
                    Some(back) => FieldValue::dual_face(front, resolver(&*back, ctx)),
                    None => front,
                }
            }),
        }
    }
}

/// Builds a lookup factory that ignores faces: the `back:` variant resolves
/// exactly like the base field.
pub fn face_independent<R, C, F>(lookup: F) -> impl Fn(Face) -> LookupFn<R, C> + 'static
where
    R: 'static,
    C: 'static,
    F: Fn(&R, &C, Option<&ComparisonContext<'_>>) -> FieldValue + Send + Sync + 'static,
{
    let lookup: LookupFn<R, C> = lookup_fn(lookup);
    move |_| Arc::clone(&lookup)
}

/// A registered field.
pub struct FieldDescriptor<R, C> {
    name: String,
    field_type: FieldType,
    lookup: LookupFn<R, C>,
}

impl<R, C> FieldDescriptor<R, C> {
    /// The canonical name, `back:`-prefixed for back variants.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Resolves the field for a record.
    pub fn lookup(
        &self,
        record: &R,
        context: &C,
        comparison: Option<&ComparisonContext<'_>>,
    ) -> FieldValue {
        (self.lookup)(record, context, comparison)
    }
}

impl<R, C> fmt::Debug for FieldDescriptor<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// A field declaration handed to [`FieldRegistryBuilder`].
pub struct FieldDefinition<R, C> {
    name: String,
    field_type: FieldType,
    aliases: Vec<String>,
    legacy_alias: Option<String>,
    factory: Box<dyn Fn(Face) -> LookupFn<R, C>>,
}

impl<R, C> FieldDefinition<R, C> {
    /// Declares a field. The factory is called once per face.
    pub fn new<F>(name: impl Into<String>, field_type: FieldType, factory: F) -> Self
    where
        F: Fn(Face) -> LookupFn<R, C> + 'static,
    {
        Self {
            name: name.into(),
            field_type,
            aliases: Vec::new(),
            legacy_alias: None,
            factory: Box::new(factory),
        }
    }

    /// Adds short aliases. Each alias also gets a `back:` variant.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the legacy single-letter alias. Legacy aliases have no `back:` variant.
    pub fn legacy_alias(mut self, alias: impl Into<String>) -> Self {
        self.legacy_alias = Some(alias.into());
        self
    }
}

/// Collects field definitions and builds an immutable [`FieldRegistry`].
pub struct FieldRegistryBuilder<R, C> {
    definitions: Vec<FieldDefinition<R, C>>,
}

impl<R, C> Default for FieldRegistryBuilder<R, C> {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }
}

impl<R, C> FieldRegistryBuilder<R, C> {
    /// Adds a field definition.
    pub fn field(mut self, definition: FieldDefinition<R, C>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Declares a field without aliases.
    pub fn register<F>(self, name: impl Into<String>, field_type: FieldType, factory: F) -> Self
    where
        F: Fn(Face) -> LookupFn<R, C> + 'static,
    {
        self.field(FieldDefinition::new(name, field_type, factory))
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::DuplicateField` if two definitions claim the same
    /// name or alias.
    pub fn build(self) -> QueryResult<FieldRegistry<R, C>> {
        let mut registry = FieldRegistry {
            fields: HashMap::new(),
            names: Vec::with_capacity(self.definitions.len()),
        };

        for definition in self.definitions {
            let front = Arc::new(FieldDescriptor {
                name: definition.name.clone(),
                field_type: definition.field_type,
                lookup: (definition.factory)(Face::Front),
            });
            let back = Arc::new(FieldDescriptor {
                name: format!("{BACK_PREFIX}{}", definition.name),
                field_type: definition.field_type,
                lookup: (definition.factory)(Face::Back),
            });

            for name in std::iter::once(&definition.name).chain(&definition.aliases) {
                registry.insert(name.clone(), Arc::clone(&front))?;
                registry.insert(format!("{BACK_PREFIX}{name}"), Arc::clone(&back))?;
            }

            if let Some(legacy) = definition.legacy_alias {
                registry.insert(legacy, Arc::clone(&front))?;
            }

            registry.names.push(definition.name);
        }

        tracing::debug!(
            fields = registry.names.len(),
            names = registry.fields.len(),
            "built field registry"
        );
        Ok(registry)
    }
}

/// Maps query-visible names to field descriptors.
///
/// Built once through [`FieldRegistry::builder`] and never mutated afterwards.
/// Lookup is case-sensitive and matches canonical names, aliases, legacy
/// aliases and their `back:` variants.
pub struct FieldRegistry<R, C> {
    fields: HashMap<String, Arc<FieldDescriptor<R, C>>>,
    names: Vec<String>,
}

impl<R, C> FieldRegistry<R, C> {
    /// Starts building a registry.
    pub fn builder() -> FieldRegistryBuilder<R, C> {
        FieldRegistryBuilder::default()
    }

    fn insert(&mut self, name: String, descriptor: Arc<FieldDescriptor<R, C>>) -> QueryResult<()> {
        if self.fields.contains_key(&name) {
            return Err(QueryError::DuplicateField { name });
        }
        self.fields.insert(name, descriptor);
        Ok(())
    }

    /// Resolves a name to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownField`, with a suggestion when a
    /// registered name is within a small edit distance.
    pub fn resolve(&self, name: &str) -> QueryResult<&Arc<FieldDescriptor<R, C>>> {
        self.fields.get(name).ok_or_else(|| {
            QueryError::unknown_field(name, find_similar_name(name, self.fields.keys()))
        })
    }

    /// Returns the descriptor for a name, if registered.
    pub fn get(&self, name: &str) -> Option<&Arc<FieldDescriptor<R, C>>> {
        self.fields.get(name)
    }

    /// Returns true if the name (or alias) is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Canonical field names in registration order.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    /// Number of resolvable names, aliases included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R, C> fmt::Debug for FieldRegistry<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Finds the closest registered name within the suggestion threshold.
fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a String>,
) -> Option<String> {
    let (best_match, best_distance) = candidates
        .map(|name| (name, levenshtein(query, name)))
        .min_by(|(a_name, a), (b_name, b)| a.cmp(b).then_with(|| a_name.cmp(b_name)))?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Card {
        cost: Option<i64>,
        back: Option<Box<Card>>,
    }

    struct Ctx {
        match_backs: bool,
    }

    impl FaceResolution for Ctx {
        fn match_backs(&self) -> bool {
            self.match_backs
        }
    }

    impl TwoFaced<Ctx> for Card {
        fn back_face<'a>(&'a self, _context: &'a Ctx) -> Option<Cow<'a, Self>> {
            self.back.as_deref().map(Cow::Borrowed)
        }
    }

    fn registry() -> FieldRegistry<Card, Ctx> {
        FieldRegistry::builder()
            .field(
                FieldDefinition::new(
                    "cost",
                    FieldType::Number,
                    face_aware(|card: &Card, _: &Ctx| FieldValue::from(card.cost)),
                )
                .aliases(["co"])
                .legacy_alias("o"),
            )
            .register(
                "constant",
                FieldType::Number,
                face_independent(|_: &Card, _: &Ctx, _| FieldValue::from(7)),
            )
            .build()
            .unwrap()
    }

    fn two_faced(front: i64, back: i64) -> Card {
        Card {
            cost: Some(front),
            back: Some(Box::new(Card {
                cost: Some(back),
                back: None,
            })),
        }
    }

    #[test]
    fn test_resolve_name_aliases_and_back_variants() {
        let registry = registry();
        for name in ["cost", "co", "o", "back:cost", "back:co", "constant", "back:constant"] {
            assert!(registry.contains(name), "{name}");
        }
        assert!(!registry.contains("back:o"));
        assert_eq!(registry.resolve("co").unwrap().name(), "cost");
        assert_eq!(registry.resolve("back:co").unwrap().name(), "back:cost");
        assert_eq!(registry.field_names(), ["cost", "constant"]);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = registry();
        assert!(matches!(
            registry.resolve("Cost"),
            Err(QueryError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_unknown_field_suggestion() {
        let registry = registry();
        let err = registry.resolve("cots").unwrap_err();
        assert_eq!(
            err,
            QueryError::unknown_field("cots", Some("cost".to_string()))
        );

        let err = registry.resolve("completely_different").unwrap_err();
        assert_eq!(err, QueryError::unknown_field("completely_different", None));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let result = FieldRegistry::<Card, Ctx>::builder()
            .register(
                "cost",
                FieldType::Number,
                face_independent(|_: &Card, _: &Ctx, _| FieldValue::Null),
            )
            .field(
                FieldDefinition::new(
                    "price",
                    FieldType::Number,
                    face_independent(|_: &Card, _: &Ctx, _| FieldValue::Null),
                )
                .aliases(["cost"]),
            )
            .build();

        assert_eq!(
            result.unwrap_err(),
            QueryError::DuplicateField {
                name: "cost".to_string()
            }
        );
    }

    #[test]
    fn test_front_lookup_without_match_backs() {
        let registry = registry();
        let ctx = Ctx { match_backs: false };
        let cost = registry.resolve("cost").unwrap();
        assert_eq!(cost.lookup(&two_faced(1, 3), &ctx, None), FieldValue::from(1));
    }

    #[test]
    fn test_front_lookup_with_match_backs_yields_dual_face() {
        let registry = registry();
        let ctx = Ctx { match_backs: true };
        let cost = registry.resolve("cost").unwrap();
        assert_eq!(
            cost.lookup(&two_faced(1, 3), &ctx, None),
            FieldValue::dual_face(1.into(), 3.into())
        );
        assert_eq!(
            cost.lookup(&two_faced(1, 3), &ctx, None),
            FieldValue::DualFace(vec![1.into(), 3.into()])
        );
        // Identical faces collapse
        assert_eq!(cost.lookup(&two_faced(2, 2), &ctx, None), FieldValue::from(2));
    }

    #[test]
    fn test_back_lookup_ignores_match_backs() {
        let registry = registry();
        let back = registry.resolve("back:cost").unwrap();
        for match_backs in [false, true] {
            let ctx = Ctx { match_backs };
            assert_eq!(back.lookup(&two_faced(1, 3), &ctx, None), FieldValue::from(3));
        }

        let single = Card {
            cost: Some(1),
            back: None,
        };
        let ctx = Ctx { match_backs: false };
        assert_eq!(back.lookup(&single, &ctx, None), FieldValue::Null);

        let zeroed = FieldRegistry::<Card, Ctx>::builder()
            .register(
                "cost",
                FieldType::Number,
                face_aware(|card: &Card, _: &Ctx| card.cost.unwrap_or(0).into()),
            )
            .build()
            .unwrap();
        let back = zeroed.resolve("back:cost").unwrap();
        assert_eq!(back.lookup(&single, &ctx, None), FieldValue::from(0));
    }

    #[test]
    fn test_face_independent_back_variant_matches_front() {
        let registry = registry();
        let ctx = Ctx { match_backs: true };
        let card = two_faced(1, 3);
        assert_eq!(
            registry.resolve("back:constant").unwrap().lookup(&card, &ctx, None),
            FieldValue::from(7)
        );
    }
}
