//! Node shape and type helpers (spec.md §3, §4.A).
//!
//! Dynamic JSON-LD trees become a typed envelope here (spec.md §9's
//! "dynamic JSON-LD trees → typed sum types" redesign note): `Resource`
//! holds the common attributes every node has, plus an `extra` bag for
//! whatever domain-specific properties the seed data or a caller attaches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which identifier family a string belongs to, decided purely by prefix
/// (spec.md §9 Open Question #3 — never by structural heuristic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Iri,
    Did,
    Urn,
}

pub fn identifier_kind(id: &str) -> IdentifierKind {
    if id.starts_with("did:") {
        IdentifierKind::Did
    } else if id.starts_with("urn:") {
        IdentifierKind::Urn
    } else {
        IdentifierKind::Iri
    }
}

/// A single HTTP method an affordance may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A SHACL-lite property constraint (spec.md §3 "Property shape").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyShape {
    pub property: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#in: Option<Vec<Value>>,
}

/// A governance constraint attached to an affordance (spec.md §4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Constraint {
    Payment {
        amount: u64,
        currency: String,
        recipient: String,
    },
    TokenGate {
        required_token: String,
        min_balance: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chain_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        standard: Option<String>,
    },
    Policy {
        #[serde(default)]
        permissions: Vec<PolicyClause>,
        #[serde(default)]
        prohibitions: Vec<PolicyClause>,
        #[serde(default)]
        obligations: Vec<PolicyClause>,
    },
    /// Composite of two constraints combined with AND/OR (spec.md §4.F,
    /// "single level", no nesting requirement).
    Composite {
        op: CompositeOp,
        terms: Vec<Constraint>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeOp {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyClause {
    pub target: String,
    pub action: String,
    #[serde(default)]
    pub constraints: BTreeMap<String, Value>,
}

/// An operation (affordance) embedded within a resource (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub method: HttpMethod,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expects: Option<Vec<PropertyShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

impl Operation {
    /// Resolves the operation's target, falling back to the parent
    /// resource id (spec.md §3).
    pub fn target_or<'a>(&'a self, parent_id: &'a str) -> &'a str {
        self.target.as_deref().unwrap_or(parent_id)
    }
}

/// A node in the mesh (spec.md §3 "Resource").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Vec<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Vec<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Arbitrary labeled properties not otherwise modeled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(id: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            id: id.into(),
            types,
            context: None,
            operation: None,
            member: None,
            total_items: None,
            first: None,
            previous: None,
            next: None,
            last: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self) -> Self {
        self.context = Some(Value::String(super::context::CANONICAL_CONTEXT_URL.into()));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn with_operations(mut self, ops: Vec<Operation>) -> Self {
        self.operation = Some(ops);
        self
    }

    pub fn with_members(mut self, members: Vec<Resource>) -> Self {
        self.total_items = Some(members.len() as u64);
        self.member = Some(members);
        self
    }

    /// `typesOf` — normalizes the type attribute (spec.md §4.A).
    pub fn types_of(&self) -> &[String] {
        &self.types
    }

    /// `isOfType` (spec.md §4.A).
    pub fn is_of_type(&self, t: &str) -> bool {
        self.types.iter().any(|ty| ty == t)
    }

    /// Primary type, i.e. `types[0]` (spec.md §3 invariant).
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// `operationsOf` — folds in operations nested under
    /// `member[*].operation` so a collection's affordances are discoverable
    /// through the collection itself (spec.md §4.A).
    pub fn operations_of(&self) -> Vec<&Operation> {
        let mut ops: Vec<&Operation> = self.operation.iter().flatten().collect();
        if let Some(members) = &self.member {
            for m in members {
                ops.extend(m.operation.iter().flatten());
            }
        }
        ops
    }

    pub fn identifier_kind(&self) -> IdentifierKind {
        identifier_kind(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_kind_by_prefix() {
        assert_eq!(identifier_kind("did:web:example.com"), IdentifierKind::Did);
        assert_eq!(identifier_kind("urn:uuid:abc"), IdentifierKind::Urn);
        assert_eq!(
            identifier_kind("http://example.com/a"),
            IdentifierKind::Iri
        );
    }

    #[test]
    fn operations_of_folds_member_operations() {
        let product = Resource::new("https://x/product/1", vec!["schema:Product".into()])
            .with_operations(vec![Operation {
                method: HttpMethod::Post,
                title: "Buy".into(),
                expects: None,
                returns: None,
                target: None,
                constraint: None,
            }]);
        let collection = Resource::new("https://x/catalog", vec!["hydra:Collection".into()])
            .with_members(vec![product]);
        assert_eq!(collection.operations_of().len(), 1);
    }
}
