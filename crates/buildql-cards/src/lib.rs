//! Card catalog search built on buildql.
//!
//! # Quick Start
//!
//! ```
//! use buildql_cards::prelude::*;
//!
//! let mut card = Card::new("01006", "Roland's .38 Special");
//! card.xp = Some(0);
//! card.cost = Some(3);
//!
//! let search = CardSearch::new(Metadata::default().with_cards([card])).unwrap();
//! let matched = search.search("name = \"38\" & xp == 0").unwrap();
//! assert_eq!(matched.len(), 1);
//! ```
//!
//! For convenient imports, use the prelude. It re-exports [`CardSearch`],
//! the error types, the catalog models and the field registry.

pub mod access;
pub mod context;
pub mod error;
pub mod fields;
pub mod models;
pub mod prelude;
pub mod search;

pub use error::{Error, Result};
pub use search::CardSearch;
