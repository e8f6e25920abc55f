//! Linked-data core & validator (spec.md §4.A).

pub mod context;
pub mod resource;
pub mod validate;

pub use context::{compact_iri, expand_iri, CANONICAL_CONTEXT_URL};
pub use resource::{
    identifier_kind, Constraint, HttpMethod, IdentifierKind, Operation, PolicyClause,
    PropertyShape, Resource,
};
