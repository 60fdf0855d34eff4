//! Field-query language for structured records.
//!
//! A query such as `(xp == 0 | xp == 2) & cost < 3` is parsed into an
//! [`Expr`], then compiled against a [`FieldRegistry`] and a resolution
//! context into a [`Predicate`] that can be matched against any number of
//! records.
//!
//! The crate is generic over the record type `R` and the context type `C`.
//! A domain declares its fields once in a registry; the parser and
//! interpreter never look at records directly.
//!
//! # Example
//!
//! ```
//! use buildql::fields::{face_independent, FieldRegistry, FieldType, FieldValue};
//! use buildql::QueryEngine;
//!
//! struct Card {
//!     name: &'static str,
//!     cost: i64,
//! }
//!
//! let registry = FieldRegistry::<Card, ()>::builder()
//!     .register(
//!         "name",
//!         FieldType::String,
//!         face_independent(|card: &Card, _: &(), _| FieldValue::from(card.name)),
//!     )
//!     .register(
//!         "cost",
//!         FieldType::Number,
//!         face_independent(|card: &Card, _: &(), _| FieldValue::from(card.cost)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let engine = QueryEngine::new(registry);
//! let predicate = engine.compile("name = \"roland\" & cost < 3", &()).unwrap();
//!
//! let cards = [
//!     Card { name: "Roland's .38 Special", cost: 3 },
//!     Card { name: "Roland Banks", cost: 0 },
//! ];
//! let matched = predicate.filter(&cards).unwrap();
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].name, "Roland Banks");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod fuzzy;
pub mod interpreter;
pub mod query;

pub use config::{ConfigError, QueryConfig};
pub use engine::QueryEngine;
pub use error::{QueryError, QueryResult};
pub use fields::{FieldRegistry, FieldType, FieldValue};
pub use interpreter::{Interpreter, Predicate};
pub use query::{parse, Expr};
