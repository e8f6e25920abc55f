//! Per-source dispatch (spec.md §4.G "Dispatcher"): applies the parsed
//! predicate/order/limit clauses to each source's row set independently,
//! then stamps each returned row with the source it came from so the
//! merger — and later the provenance service — can attribute it.

use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};

use super::parser::{CompareOp, Literal, ParsedQuery};
use super::planner::QueryPlan;
use super::sources;

#[derive(Debug, Clone)]
pub struct SourceRow {
    pub source: String,
    pub row: Value,
}

#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub rows: Vec<SourceRow>,
    pub sources_queried: Vec<String>,
    pub dispatched_at: chrono::DateTime<Utc>,
}

/// Runs the plan against every resolved source, applying filter, projection,
/// sort, and limit per-source before the merge step (spec.md §4.G: "limit
/// applies per source before merge, not to the merged total").
pub fn dispatch(plan: &QueryPlan, parsed: &ParsedQuery) -> DispatchResult {
    let mut rows = Vec::new();
    for source in &plan.sources {
        let started = Instant::now();
        let dataset = sources::rows_for(source).unwrap_or_default();
        let mut filtered: Vec<Value> = dataset
            .into_iter()
            .filter(|row| parsed.predicates.iter().all(|p| predicate_matches(p, row)))
            .collect();

        if let Some(order) = &parsed.order_by {
            filtered.sort_by(|a, b| compare_field(a, b, &order.field));
            if order.direction == super::parser::SortDirection::Desc {
                filtered.reverse();
            }
        }

        filtered.truncate(parsed.limit as usize);
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        for row in filtered {
            let mut row = project(row, &parsed.projection, parsed.select_star);
            if let Value::Object(ref mut obj) = row {
                obj.insert(
                    "provenance".to_string(),
                    json!({
                        "sourceNode": source,
                        "executionTime": execution_time_ms,
                    }),
                );
            }
            rows.push(SourceRow {
                source: source.clone(),
                row,
            });
        }
    }

    DispatchResult {
        rows,
        sources_queried: plan.sources.clone(),
        dispatched_at: Utc::now(),
    }
}

fn predicate_matches(predicate: &super::parser::Predicate, row: &Value) -> bool {
    let Some(field_value) = row.get(&predicate.field) else {
        return false;
    };
    match &predicate.value {
        Literal::Number(n) => {
            let Some(actual) = field_value.as_f64() else {
                return false;
            };
            compare_numeric(actual, *n, predicate.op)
        }
        Literal::Text(s) => {
            let Some(actual) = field_value.as_str() else {
                return false;
            };
            match predicate.op {
                CompareOp::Eq => actual == s,
                CompareOp::Neq => actual != s,
                CompareOp::Like => actual.contains(s.as_str()),
                _ => false,
            }
        }
    }
}

fn compare_numeric(actual: f64, expected: f64, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => actual == expected,
        CompareOp::Neq => actual != expected,
        CompareOp::Gt => actual > expected,
        CompareOp::Gte => actual >= expected,
        CompareOp::Lt => actual < expected,
        CompareOp::Lte => actual <= expected,
        CompareOp::Like => false,
    }
}

fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    let av = a.get(field);
    let bv = b.get(field);
    match (av.and_then(Value::as_f64), bv.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => av
            .and_then(Value::as_str)
            .unwrap_or_default()
            .cmp(bv.and_then(Value::as_str).unwrap_or_default()),
    }
}

fn project(row: Value, projection: &[String], select_star: bool) -> Value {
    if select_star || projection.is_empty() {
        return row;
    }
    let mut obj = serde_json::Map::new();
    for field in projection {
        if let Some(v) = row.get(field) {
            obj.insert(field.clone(), v.clone());
        }
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federation::parser::parse;
    use crate::federation::planner::plan as plan_query;

    #[test]
    fn filters_by_predicate() {
        let parsed = parse("SELECT * FROM analytics WHERE total_spend > 500").unwrap();
        let plan = plan_query(&parsed, "").unwrap();
        let result = dispatch(&plan, &parsed);
        assert_eq!(result.rows.len(), 2);
        assert!(result
            .rows
            .iter()
            .all(|r| r.row["total_spend"].as_f64().unwrap() > 500.0));
    }

    #[test]
    fn projects_only_requested_fields() {
        let parsed = parse("SELECT user_id FROM analytics").unwrap();
        let plan = plan_query(&parsed, "").unwrap();
        let result = dispatch(&plan, &parsed);
        for r in &result.rows {
            assert!(r.row.get("user_id").is_some());
            assert!(r.row.get("segment").is_none());
        }
    }

    #[test]
    fn rows_are_stamped_with_their_source() {
        let parsed = parse("SELECT * FROM sales").unwrap();
        let plan = plan_query(&parsed, "").unwrap();
        let result = dispatch(&plan, &parsed);
        assert!(result.rows.iter().all(|r| r.source == "sales"));
    }

    #[test]
    fn limit_applies_per_source() {
        let parsed = parse("SELECT * FROM sales JOIN analytics LIMIT 1").unwrap();
        let plan = plan_query(&parsed, "").unwrap();
        let result = dispatch(&plan, &parsed);
        assert_eq!(result.rows.iter().filter(|r| r.source == "sales").count(), 1);
        assert_eq!(
            result.rows.iter().filter(|r| r.source == "analytics").count(),
            1
        );
    }
}
