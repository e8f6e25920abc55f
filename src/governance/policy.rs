//! Policy constraint (spec.md §4.F #3): a declarative rights document
//! (permission/prohibition/obligation lists), each clause carrying a
//! target, action, and operator-value constraints.

use serde_json::Value;

use crate::ld::PolicyClause;

/// The context a policy clause is evaluated against: the action being
/// attempted and whatever request-derived facts clauses may reference.
pub struct PolicyContext<'a> {
    pub target: &'a str,
    pub action: &'a str,
    pub facts: &'a std::collections::BTreeMap<String, Value>,
}

fn clause_applies(clause: &PolicyClause, ctx: &PolicyContext<'_>) -> bool {
    clause.target == ctx.target && clause.action == ctx.action
}

fn constraints_satisfied(clause: &PolicyClause, ctx: &PolicyContext<'_>) -> bool {
    clause
        .constraints
        .iter()
        .all(|(key, expected)| ctx.facts.get(key) == Some(expected))
}

/// Evaluates permission/prohibition/obligation clauses against the given
/// context. A matching prohibition is fatal; an unsatisfied obligation
/// (one that applies but whose constraints are not met) is fatal;
/// otherwise the request is permitted (spec.md §4.F #3).
pub fn evaluate(
    permissions: &[PolicyClause],
    prohibitions: &[PolicyClause],
    obligations: &[PolicyClause],
    ctx: &PolicyContext<'_>,
) -> bool {
    if prohibitions.iter().any(|c| clause_applies(c, ctx)) {
        return false;
    }
    if obligations
        .iter()
        .any(|c| clause_applies(c, ctx) && !constraints_satisfied(c, ctx))
    {
        return false;
    }
    if permissions.is_empty() {
        return true;
    }
    permissions
        .iter()
        .any(|c| clause_applies(c, ctx) && constraints_satisfied(c, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn clause(target: &str, action: &str) -> PolicyClause {
        PolicyClause {
            target: target.into(),
            action: action.into(),
            constraints: BTreeMap::new(),
        }
    }

    #[test]
    fn prohibition_match_is_fatal() {
        let facts = BTreeMap::new();
        let ctx = PolicyContext {
            target: "res",
            action: "read",
            facts: &facts,
        };
        let prohibitions = vec![clause("res", "read")];
        assert!(!evaluate(&[], &prohibitions, &[], &ctx));
    }

    #[test]
    fn no_applicable_clauses_permits() {
        let facts = BTreeMap::new();
        let ctx = PolicyContext {
            target: "res",
            action: "read",
            facts: &facts,
        };
        assert!(evaluate(&[], &[], &[], &ctx));
    }

    #[test]
    fn unsatisfied_obligation_is_fatal() {
        let facts = BTreeMap::new();
        let ctx = PolicyContext {
            target: "res",
            action: "read",
            facts: &facts,
        };
        let mut obligation = clause("res", "read");
        obligation
            .constraints
            .insert("ack".into(), serde_json::json!(true));
        assert!(!evaluate(&[], &[], &[obligation], &ctx));
    }
}
