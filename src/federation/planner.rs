//! Keyword-based query planner (spec.md §4.G "Planner"): maps a parsed
//! query's FROM/JOIN targets onto the source dictionary. No cost-based
//! optimization — a table name either resolves to a known source or it
//! falls back to `"default"`.

use super::parser::ParsedQuery;
use super::sources;

#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub sources: Vec<String>,
    pub query: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no source could be resolved for this query")]
    NoSourceResolved,
}

/// Resolves every table referenced by the query to a backing source name,
/// falling back to `"default"` for anything unrecognized, and de-duplicates
/// while preserving first-seen order (spec.md §4.G: "merger preserves
/// per-source contiguity").
pub fn plan(parsed: &ParsedQuery, raw_query: &str) -> Result<QueryPlan, PlanError> {
    let mut resolved = Vec::new();
    for table in std::iter::once(&parsed.from).chain(parsed.extra_tables.iter()) {
        let source = resolve(table);
        if !resolved.contains(&source) {
            resolved.push(source);
        }
    }
    if resolved.is_empty() {
        return Err(PlanError::NoSourceResolved);
    }
    Ok(QueryPlan {
        sources: resolved,
        query: raw_query.to_string(),
    })
}

fn resolve(table: &str) -> String {
    let lower = table.to_ascii_lowercase();
    if sources::rows_for(&lower).is_some() {
        lower
    } else {
        "default".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federation::parser::parse;

    #[test]
    fn resolves_known_table_to_itself() {
        let parsed = parse("SELECT * FROM analytics").unwrap();
        let plan = plan(&parsed, "SELECT * FROM analytics").unwrap();
        assert_eq!(plan.sources, vec!["analytics"]);
    }

    #[test]
    fn unknown_table_falls_back_to_default() {
        let parsed = parse("SELECT * FROM made_up_table").unwrap();
        let plan = plan(&parsed, "SELECT * FROM made_up_table").unwrap();
        assert_eq!(plan.sources, vec!["default"]);
    }

    #[test]
    fn join_widens_source_list_without_duplicates() {
        let parsed = parse("SELECT * FROM sales JOIN sales").unwrap();
        let plan = plan(&parsed, "SELECT * FROM sales JOIN sales").unwrap();
        assert_eq!(plan.sources, vec!["sales"]);
    }
}
