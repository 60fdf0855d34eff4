//! Card catalog data types.
//!
//! This module provides the serde models for cards and for the master data
//! that card fields resolve against.

mod card;
mod metadata;

pub use card::*;
pub use metadata::*;
