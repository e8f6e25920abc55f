//! A small URI-Template subset (spec.md §4.J "expandTemplate"): positional
//! `{x}` and query-form `{?x}`/`{?x,y,z}` expansion only — not the full
//! RFC 6570 grammar, which this protocol never needs.

use std::collections::BTreeMap;

/// Expands `template` against `vars`, eliding any variable with no entry
/// in `vars` (spec.md §4.J: "unresolved variables are elided").
pub fn expand(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut expr = String::new();
        for (_, c2) in chars.by_ref() {
            if c2 == '}' {
                break;
            }
            expr.push(c2);
        }
        out.push_str(&expand_expression(&expr, vars));
    }
    out
}

fn expand_expression(expr: &str, vars: &BTreeMap<String, String>) -> String {
    if let Some(names) = expr.strip_prefix('?') {
        let pairs: Vec<String> = names
            .split(',')
            .filter_map(|name| vars.get(name).map(|v| format!("{name}={v}")))
            .collect();
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    } else {
        vars.get(expr).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn expands_positional_variable() {
        let out = expand("/nodes/{type}/{id}", &vars(&[("type", "store"), ("id", "42")]));
        assert_eq!(out, "/nodes/store/42");
    }

    #[test]
    fn expands_query_group() {
        let out = expand("/catalog{?q,page}", &vars(&[("q", "widget"), ("page", "2")]));
        assert_eq!(out, "/catalog?q=widget&page=2");
    }

    #[test]
    fn elides_unresolved_variables() {
        let out = expand("/catalog{?q,type}", &vars(&[("q", "widget")]));
        assert_eq!(out, "/catalog?q=widget");
    }

    #[test]
    fn empty_query_group_collapses_entirely() {
        let out = expand("/catalog{?q}", &BTreeMap::new());
        assert_eq!(out, "/catalog");
    }
}
