//! Field registry and runtime field values.
//!
//! Every queryable attribute is declared once as a name, a [`FieldType`] and a
//! lookup factory. The registry derives the aliases and the `back:` variant
//! of each field from that single declaration.

mod registry;
mod value;

pub use registry::{
    face_aware, face_independent, lookup_fn, Face, FaceResolution, FieldDefinition,
    FieldDescriptor, FieldRegistry, FieldRegistryBuilder, LookupFn, TwoFaced, BACK_PREFIX,
};
pub use value::{ComparisonContext, FieldType, FieldValue, Operand};
