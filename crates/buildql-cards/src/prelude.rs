//! Prelude module for convenient imports.
//!
//! ```
//! use buildql_cards::prelude::*;
//!
//! // Now you have access to:
//! // - CardSearch (catalog search)
//! // - Error, Result (error handling)
//! // - Card, Metadata, Pack, Cycle ... (catalog models)
//! // - CardLookupContext, card_fields (field registry)
//! ```

// Search
pub use crate::search::CardSearch;

// Error types
pub use crate::error::{Error, Result};

// Field registry
pub use crate::context::CardLookupContext;
pub use crate::fields::card_fields;

// Catalog models
pub use crate::models::{
    Card, Cycle, DeckOption, EncounterSet, LevelRange, Metadata, Pack, Restrictions, TabooSet,
};
