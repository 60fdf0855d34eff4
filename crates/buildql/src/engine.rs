//! Query engine facade.
//!
//! [`QueryEngine`] ties a field registry to the parser and interpreter and
//! caches what can be reused between queries: parsed expressions keyed by
//! query text, and fuzzy needles shared by every predicate it compiles.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::QueryConfig;
use crate::error::QueryResult;
use crate::fields::FieldRegistry;
use crate::fuzzy::NeedleCache;
use crate::interpreter::{Interpreter, Predicate};
use crate::query::{Expr, QueryParser};

/// Parses and compiles queries against one field registry.
pub struct QueryEngine<R, C> {
    registry: Arc<FieldRegistry<R, C>>,
    config: QueryConfig,
    asts: Mutex<HashMap<String, Arc<Expr>>>,
    needles: Arc<NeedleCache>,
}

impl<R, C> QueryEngine<R, C> {
    /// Creates an engine with the default configuration.
    pub fn new(registry: impl Into<Arc<FieldRegistry<R, C>>>) -> Self {
        Self::with_config(registry, QueryConfig::default())
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(registry: impl Into<Arc<FieldRegistry<R, C>>>, config: QueryConfig) -> Self {
        let needles = Arc::new(NeedleCache::new(config.needle_cache_capacity));
        Self {
            registry: registry.into(),
            config,
            asts: Mutex::new(HashMap::new()),
            needles,
        }
    }

    /// Parses a query, reusing the cached expression for repeated text.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Syntax` if the text is malformed. Failed parses are
    /// not cached.
    pub fn parse(&self, text: &str) -> QueryResult<Arc<Expr>> {
        if let Some(expr) = self.cached(text) {
            tracing::trace!(query = text, "query cache hit");
            return Ok(expr);
        }

        let expr = Arc::new(QueryParser::parse(text)?);

        let mut asts = self.asts.lock().unwrap_or_else(PoisonError::into_inner);
        if asts.len() >= self.config.ast_cache_capacity {
            tracing::debug!(entries = asts.len(), "clearing query cache");
            asts.clear();
        }
        asts.insert(text.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Parses and compiles a query into a predicate over `context`.
    ///
    /// # Errors
    ///
    /// Returns any parse or compile error; see [`Interpreter::evaluate`].
    pub fn compile<'c>(&self, text: &str, context: &'c C) -> QueryResult<Predicate<'c, R, C>> {
        let expr = self.parse(text)?;
        Interpreter::new(&*self.registry, context)
            .with_needle_cache(Arc::clone(&self.needles))
            .evaluate(&expr)
    }

    /// The field registry.
    pub fn registry(&self) -> &Arc<FieldRegistry<R, C>> {
        &self.registry
    }

    /// The engine configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// The needle cache shared by compiled predicates.
    pub fn needle_cache(&self) -> &Arc<NeedleCache> {
        &self.needles
    }

    /// Number of cached parsed queries.
    pub fn cached_queries(&self) -> usize {
        self.asts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cached(&self, text: &str) -> Option<Arc<Expr>> {
        self.asts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned()
    }
}

impl<R, C> fmt::Debug for QueryEngine<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{face_independent, FieldType, FieldValue};
    use crate::QueryError;

    struct Card {
        xp: i64,
        name: &'static str,
    }

    fn engine(config: QueryConfig) -> QueryEngine<Card, ()> {
        let registry = FieldRegistry::builder()
            .register(
                "xp",
                FieldType::Number,
                face_independent(|card: &Card, _: &(), _| FieldValue::from(card.xp)),
            )
            .register(
                "name",
                FieldType::String,
                face_independent(|card: &Card, _: &(), _| FieldValue::from(card.name)),
            )
            .build()
            .unwrap();
        QueryEngine::with_config(registry, config)
    }

    #[test]
    fn test_compile_and_match() {
        let engine = engine(QueryConfig::default());
        let predicate = engine.compile("xp > 1 & name = \"roland\"", &()).unwrap();

        assert!(predicate
            .matches(&Card {
                xp: 2,
                name: "Roland Banks"
            })
            .unwrap());
        assert!(!predicate
            .matches(&Card {
                xp: 0,
                name: "Roland Banks"
            })
            .unwrap());
    }

    #[test]
    fn test_parse_is_cached_by_text() {
        let engine = engine(QueryConfig::default());
        let first = engine.parse("xp == 1").unwrap();
        let second = engine.parse("xp == 1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_queries(), 1);
    }

    #[test]
    fn test_failed_parse_is_not_cached() {
        let engine = engine(QueryConfig::default());
        assert!(matches!(engine.parse("xp =="), Err(QueryError::Syntax { .. })));
        assert_eq!(engine.cached_queries(), 0);
    }

    #[test]
    fn test_query_cache_is_bounded() {
        let engine = engine(QueryConfig {
            ast_cache_capacity: 2,
            ..Default::default()
        });
        for xp in 0..3 {
            engine.parse(&format!("xp == {xp}")).unwrap();
        }
        assert_eq!(engine.cached_queries(), 1);
    }

    #[test]
    fn test_compiled_predicates_share_needles() {
        let engine = engine(QueryConfig::default());
        let card = Card {
            xp: 0,
            name: "Daisy Walker",
        };
        for _ in 0..3 {
            engine.compile("name = \"daisy\"", &()).unwrap().matches(&card).unwrap();
        }
        assert_eq!(engine.needle_cache().len(), 1);
    }

    #[test]
    fn test_compile_reports_unknown_field() {
        let engine = engine(QueryConfig::default());
        let err = engine.compile("nam = \"x\"", &()).unwrap_err();
        assert_eq!(err, QueryError::unknown_field("nam", Some("name".to_string())));
    }
}
