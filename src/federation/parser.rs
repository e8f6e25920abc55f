//! Hand-written recursive-descent parser for the federated query dialect
//! (spec.md §4.G, §9 "parser for queries → table-driven state machine"
//! redesign note): a proper subset of SQL (SELECT/FROM/WHERE/ORDER/LIMIT),
//! anything outside it is rejected. Grounded in the teacher's
//! `src/validate/mod.rs` discipline of an enum-of-reasons error type
//! produced by direct, structural checks rather than a grammar library.

use thiserror::Error;

const DEFAULT_LIMIT: u64 = 100;
const MAX_LIMIT: u64 = 10_000;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("query must start with SELECT")]
    MissingSelect,
    #[error("query has no FROM clause")]
    MissingFrom,
    #[error("unexpected token near `{0}`")]
    UnexpectedToken(String),
    #[error("unknown comparison operator `{0}`")]
    UnknownOperator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub projection: Vec<String>,
    pub select_star: bool,
    pub from: String,
    /// Extra tables pulled in via JOIN/UNION (spec.md §4.G: "used to widen
    /// the source set, not to compute real joins").
    pub extra_tables: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub order_by: Option<OrderBy>,
    pub limit: u64,
}

/// Parses the declarative query text (spec.md §4.G "Parser").
pub fn parse(text: &str) -> Result<ParsedQuery, ParseError> {
    let tokens = tokenize(text);
    let mut cursor = Cursor { tokens, pos: 0 };

    cursor.expect_keyword("SELECT")?;
    let (projection, select_star) = parse_projection(&mut cursor)?;

    cursor.expect_keyword("FROM")?;
    let from = strip_table_prefix(cursor.next_or(ParseError::MissingFrom)?);

    let mut extra_tables = Vec::new();
    let mut predicates = Vec::new();
    let mut order_by = None;
    let mut limit = DEFAULT_LIMIT;

    while let Some(tok) = cursor.peek() {
        match tok.to_ascii_uppercase().as_str() {
            "JOIN" | "UNION" => {
                cursor.advance();
                extra_tables.push(strip_table_prefix(cursor.next_or(ParseError::MissingFrom)?));
                // Optional "ON ..." / trailing clause words are swallowed
                // up to the next recognized keyword — this dialect does
                // not compute real joins (spec.md §4.G).
                while let Some(t) = cursor.peek() {
                    if is_keyword(t) {
                        break;
                    }
                    cursor.advance();
                }
            }
            "WHERE" => {
                cursor.advance();
                predicates.push(parse_predicate(&mut cursor)?);
                while cursor.peek().is_some_and(|t| t.eq_ignore_ascii_case("AND")) {
                    cursor.advance();
                    predicates.push(parse_predicate(&mut cursor)?);
                }
            }
            "ORDER" => {
                cursor.advance();
                cursor.expect_keyword("BY")?;
                let field = strip_table_prefix(cursor.next_or(ParseError::MissingFrom)?);
                let direction = match cursor.peek().map(|t| t.to_ascii_uppercase()) {
                    Some(ref d) if d == "DESC" => {
                        cursor.advance();
                        SortDirection::Desc
                    }
                    Some(ref d) if d == "ASC" => {
                        cursor.advance();
                        SortDirection::Asc
                    }
                    _ => SortDirection::Asc,
                };
                order_by = Some(OrderBy { field, direction });
            }
            "LIMIT" => {
                cursor.advance();
                let raw = cursor.next_or(ParseError::MissingFrom)?;
                limit = raw.parse::<u64>().unwrap_or(DEFAULT_LIMIT);
            }
            other => return Err(ParseError::UnexpectedToken(other.to_string())),
        }
    }

    Ok(ParsedQuery {
        projection,
        select_star,
        from,
        extra_tables,
        predicates,
        order_by,
        limit: limit.min(MAX_LIMIT),
    })
}

fn parse_projection(cursor: &mut Cursor) -> Result<(Vec<String>, bool), ParseError> {
    let mut fields = Vec::new();
    loop {
        let tok = cursor.next_or(ParseError::MissingSelect)?;
        if tok == "*" {
            return Ok((Vec::new(), true));
        }
        fields.push(strip_table_prefix(tok.trim_end_matches(',')));
        if !tok.ends_with(',') && !cursor.peek().is_some_and(|t| t == ",") {
            break;
        }
        if cursor.peek().is_some_and(|t| t == ",") {
            cursor.advance();
        }
    }
    Ok((fields, false))
}

fn parse_predicate(cursor: &mut Cursor) -> Result<Predicate, ParseError> {
    let field = strip_table_prefix(cursor.next_or(ParseError::MissingFrom)?);
    let op_tok = cursor.next_or(ParseError::MissingFrom)?;
    let op = match op_tok.to_ascii_uppercase().as_str() {
        "=" => CompareOp::Eq,
        "!=" | "<>" => CompareOp::Neq,
        ">" => CompareOp::Gt,
        ">=" => CompareOp::Gte,
        "<" => CompareOp::Lt,
        "<=" => CompareOp::Lte,
        "LIKE" => CompareOp::Like,
        other => return Err(ParseError::UnknownOperator(other.to_string())),
    };
    let value_tok = cursor.next_or(ParseError::MissingFrom)?;
    let value = parse_literal(value_tok);
    Ok(Predicate { field, op, value })
}

fn parse_literal(tok: &str) -> Literal {
    let unquoted = tok.trim_matches('\'').trim_matches('"');
    if let Ok(n) = unquoted.parse::<f64>() {
        Literal::Number(n)
    } else {
        Literal::Text(unquoted.to_string())
    }
}

fn strip_table_prefix(field: &str) -> String {
    field
        .rsplit_once('.')
        .map(|(_, f)| f.to_string())
        .unwrap_or_else(|| field.to_string())
}

fn is_keyword(tok: &str) -> bool {
    matches!(
        tok.to_ascii_uppercase().as_str(),
        "WHERE" | "ORDER" | "LIMIT" | "JOIN" | "UNION" | "AND" | "BY"
    )
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut buf = String::new();

    let flush = |buf: &mut String, tokens: &mut Vec<String>| {
        if !buf.is_empty() {
            tokens.push(std::mem::take(buf));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                flush(&mut buf, &mut tokens);
                let quote = c;
                let mut lit = String::new();
                for nc in chars.by_ref() {
                    if nc == quote {
                        break;
                    }
                    lit.push(nc);
                }
                tokens.push(format!("'{lit}'"));
            }
            c if c.is_whitespace() => flush(&mut buf, &mut tokens),
            ',' => {
                flush(&mut buf, &mut tokens);
                tokens.push(",".to_string());
            }
            '>' | '<' | '!' | '=' => {
                flush(&mut buf, &mut tokens);
                let mut op = c.to_string();
                if chars.peek() == Some(&'=') {
                    op.push(chars.next().unwrap());
                }
                tokens.push(op);
            }
            '*' => {
                flush(&mut buf, &mut tokens);
                tokens.push("*".to_string());
            }
            _ => buf.push(c),
        }
    }
    flush(&mut buf, &mut tokens);
    tokens
}

struct Cursor {
    tokens: Vec<String>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next_or(&mut self, err: ParseError) -> Result<&str, ParseError> {
        if self.pos >= self.tokens.len() {
            return Err(err);
        }
        let tok = self.tokens[self.pos].as_str();
        self.pos += 1;
        Ok(tok)
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.eq_ignore_ascii_case(kw) => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(ParseError::UnexpectedToken(t.to_string())),
            None => Err(ParseError::MissingSelect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_from_where_order_limit() {
        let q = parse(
            "SELECT user_id, total_spend FROM analytics WHERE total_spend > 500 ORDER BY total_spend DESC LIMIT 3",
        )
        .unwrap();
        assert_eq!(q.projection, vec!["user_id", "total_spend"]);
        assert_eq!(q.from, "analytics");
        assert_eq!(q.predicates.len(), 1);
        assert_eq!(q.predicates[0].op, CompareOp::Gt);
        assert_eq!(q.limit, 3);
        assert_eq!(q.order_by.unwrap().direction, SortDirection::Desc);
    }

    #[test]
    fn star_projection() {
        let q = parse("SELECT * FROM sales").unwrap();
        assert!(q.select_star);
    }

    #[test]
    fn limit_hard_capped() {
        let q = parse("SELECT * FROM sales LIMIT 999999").unwrap();
        assert_eq!(q.limit, MAX_LIMIT);
    }

    #[test]
    fn rejects_missing_select() {
        assert_eq!(parse("FROM sales").unwrap_err(), ParseError::MissingSelect);
    }

    #[test]
    fn join_widens_source_set() {
        let q = parse("SELECT * FROM sales JOIN inventory").unwrap();
        assert_eq!(q.extra_tables, vec!["inventory"]);
    }
}
