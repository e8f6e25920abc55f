//! Fixed prefix table and IRI expand/compact helpers (spec.md §4.A).
//!
//! JSON-LD is treated as labeled JSON trees here, not triples: this table
//! exists only so affordances and seed data can be written with short
//! prefixed names (`hydra:Collection`) and recovered to fully qualified
//! IRIs on demand, never to drive reasoning.

/// Canonical `@context` URL embedded as a constant, per spec.md §6.
pub const CANONICAL_CONTEXT_URL: &str = "https://hyprcat.example/context/v1.jsonld";

const PREFIXES: &[(&str, &str)] = &[
    ("hydra", "http://www.w3.org/ns/hydra/core#"),
    ("schema", "http://schema.org/"),
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("did", "https://www.w3.org/ns/did#"),
    ("cred", "https://www.w3.org/2018/credentials#"),
    ("odrl", "http://www.w3.org/ns/odrl/2/"),
    ("x402", "https://hyprcat.example/ns/payment#"),
    ("czero", "https://hyprcat.example/ns/federation#"),
    ("hyprcat", "https://hyprcat.example/ns/core#"),
];

/// Expands `prefix:suffix` to a fully qualified IRI using the fixed
/// namespace table. Strings that are already absolute (contain `://`) or
/// have no recognized prefix are returned unchanged.
pub fn expand_iri(compact: &str) -> String {
    if compact.contains("://") {
        return compact.to_string();
    }
    if let Some((prefix, suffix)) = compact.split_once(':') {
        if let Some((_, ns)) = PREFIXES.iter().find(|(p, _)| *p == prefix) {
            return format!("{ns}{suffix}");
        }
    }
    compact.to_string()
}

/// Inverse of [`expand_iri`]: rewrites a fully qualified IRI back to its
/// prefixed form when a namespace in the table matches, otherwise returns
/// the IRI unchanged.
pub fn compact_iri(iri: &str) -> String {
    for (prefix, ns) in PREFIXES {
        if let Some(suffix) = iri.strip_prefix(ns) {
            return format!("{prefix}:{suffix}");
        }
    }
    iri.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_prefix() {
        assert_eq!(
            expand_iri("hydra:Collection"),
            "http://www.w3.org/ns/hydra/core#Collection"
        );
    }

    #[test]
    fn round_trips() {
        let iri = expand_iri("schema:Product");
        assert_eq!(compact_iri(&iri), "schema:Product");
    }

    #[test]
    fn leaves_absolute_iris_alone() {
        assert_eq!(expand_iri("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn leaves_unknown_prefix_alone() {
        assert_eq!(expand_iri("foo:bar"), "foo:bar");
    }
}
