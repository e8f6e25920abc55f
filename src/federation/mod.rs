//! Federation query engine (spec.md §4.G): a small declarative query
//! dialect over a fixed set of simulated backing sources, taken through
//! parse → plan → dispatch → merge. No real distributed execution; the
//! engine exists to exercise the query affordance on a data product
//! resource end to end.

pub mod dispatcher;
pub mod parser;
pub mod planner;
pub mod sources;

use thiserror::Error;

pub use dispatcher::{DispatchResult, SourceRow};
pub use parser::ParsedQuery;
pub use planner::QueryPlan;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FederationError {
    #[error("query parse error: {0}")]
    Parse(#[from] parser::ParseError),
    #[error("query planning error: {0}")]
    Plan(#[from] planner::PlanError),
}

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub rows: Vec<SourceRow>,
    pub sources_queried: Vec<String>,
    pub total_results: usize,
    pub query_language: &'static str,
}

/// Runs the full parse → plan → dispatch → merge pipeline for a raw query
/// string (spec.md §4.G "Merger": flattens all source results in plan
/// order, preserving per-source contiguity, then re-applies the overall
/// `LIMIT` to the merged set).
pub fn execute(raw_query: &str) -> Result<QueryResponse, FederationError> {
    let parsed = parser::parse(raw_query)?;
    let plan = planner::plan(&parsed, raw_query)?;
    let mut result = dispatcher::dispatch(&plan, &parsed);
    result.rows.truncate(parsed.limit as usize);
    Ok(QueryResponse {
        total_results: result.rows.len(),
        rows: result.rows,
        sources_queried: result.sources_queried,
        query_language: "hyprcat-ql-1",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executes_end_to_end() {
        let resp = execute("SELECT user_id, total_spend FROM analytics WHERE total_spend > 100 ORDER BY total_spend DESC")
            .unwrap();
        assert!(resp.total_results > 0);
        assert_eq!(resp.sources_queried, vec!["analytics"]);
    }

    #[test]
    fn propagates_parse_errors() {
        let err = execute("FROM analytics");
        assert!(matches!(err, Err(FederationError::Parse(_))));
    }
}
