//! SQLite Query Executor with Read-Only Validation
//!
//! Every query passes through these checks before it reaches SQLite:
//!
//! 1. **PRAGMA gate**: PRAGMA statements must be a bare read (`PRAGMA name` or
//!    `PRAGMA name(arg)`); assignments are rejected
//! 2. **AST parsing**: other statements are parsed with the `sqlparser` SQLite dialect
//!    and must be a single query
//! 3. **Recursive body validation**: CTEs, subqueries, joins and set operations are
//!    walked so no data-modifying statement hides inside a query
//! 4. **Keyword scanning**: dangerous keywords outside string literals are rejected
//! 5. **Read-only connection**: the database is opened with `SQLITE_OPEN_READ_ONLY`
//!    and the prepared statement must report itself read-only

use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use sqlparser::ast::{Expr, Query, SetExpr, Statement, TableFactor};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::time::{Duration, Instant};

const DANGEROUS_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "UPDATE", "INSERT", "CREATE", "ALTER", "ATTACH", "DETACH", "VACUUM",
    "REINDEX", "TRUNCATE", "EXEC", "EXECUTE", "MERGE", "CALL",
];

#[derive(Debug, Clone)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub truncated: bool,
    pub execution_time_ms: u64,
}

pub struct SqlExecutor {
    conn: Connection,
    max_rows: usize,
}

impl SqlExecutor {
    /// Opens a read-only connection to the database at `db_path`
    pub fn new(db_path: &str, max_rows: usize, timeout_ms: u64) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_millis(timeout_ms))?;

        Ok(Self { conn, max_rows })
    }

    /// Validates and executes a query, returning at most `limit` rows
    pub fn execute(&self, query: &str, limit: Option<usize>) -> anyhow::Result<QueryResult> {
        let start_time = Instant::now();

        validate_query(query)?;

        let effective_limit = limit.unwrap_or(self.max_rows).min(self.max_rows);

        let pragma = is_pragma(query);
        let final_query = if pragma {
            strip_terminator(query).to_string()
        } else {
            // One extra row tells us whether the result was truncated
            apply_limit(query, effective_limit + 1)?
        };

        let mut stmt = self.conn.prepare(&final_query)?;
        if !pragma && !stmt.readonly() {
            anyhow::bail!("Only read-only statements are allowed");
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut result_rows = Vec::new();
        let mut truncated = false;

        while let Some(row) = rows.next()? {
            if result_rows.len() >= effective_limit {
                truncated = true;
                break;
            }

            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(value_to_json(row.get_ref(i)?));
            }
            result_rows.push(values);
        }

        let row_count = result_rows.len();
        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        tracing::debug!(
            row_count,
            truncated,
            execution_time_ms,
            "SQLite query executed"
        );

        Ok(QueryResult {
            columns,
            rows: result_rows,
            row_count,
            truncated,
            execution_time_ms,
        })
    }
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<BLOB {} bytes>", bytes.len())),
    }
}

fn strip_terminator(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}

fn is_pragma(query: &str) -> bool {
    query.trim_start().to_uppercase().starts_with("PRAGMA")
}

/// Validates a SQL query to ensure it is a single read-only statement
pub fn validate_query(query: &str) -> anyhow::Result<()> {
    let statement = strip_terminator(query);
    if statement.is_empty() {
        anyhow::bail!("Empty SQL statement");
    }

    if is_pragma(statement) {
        return validate_pragma(statement);
    }

    let statements = Parser::parse_sql(&SQLiteDialect {}, statement)
        .map_err(|e| anyhow::anyhow!("Failed to parse SQL: {}", e))?;

    if statements.is_empty() {
        anyhow::bail!("Empty SQL statement");
    }

    if statements.len() > 1 {
        anyhow::bail!("Multiple SQL statements are not allowed");
    }

    match &statements[0] {
        Statement::Query(query) => validate_query_tree(query)?,
        _ => anyhow::bail!("Only SELECT queries and PRAGMA statements are allowed"),
    }

    check_dangerous_keywords(statement)
}

fn validate_pragma(statement: &str) -> anyhow::Result<()> {
    let pragma_pattern = Regex::new(
        r#"(?i)^PRAGMA\s+[A-Za-z_][A-Za-z0-9_]*(\s*\(\s*['"]?[A-Za-z0-9_]+['"]?\s*\))?$"#,
    )?;

    if !pragma_pattern.is_match(statement) {
        anyhow::bail!(
            "Only read-only PRAGMA statements are allowed, e.g. PRAGMA table_info(table_name)"
        );
    }

    Ok(())
}

fn check_dangerous_keywords(statement: &str) -> anyhow::Result<()> {
    // String literals may legitimately mention these words
    let literal_pattern = Regex::new(r"'(?:[^']|'')*'")?;
    let without_literals = literal_pattern.replace_all(statement, "''").to_uppercase();

    for keyword in DANGEROUS_KEYWORDS {
        let keyword_pattern = Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))?;
        if keyword_pattern.is_match(&without_literals) {
            anyhow::bail!("Use of '{}' is not allowed in queries", keyword);
        }
    }

    Ok(())
}

fn validate_query_tree(query: &Query) -> anyhow::Result<()> {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            validate_query_tree(&cte.query)?;
        }
    }

    validate_set_expr(&query.body)
}

fn validate_set_expr(set_expr: &SetExpr) -> anyhow::Result<()> {
    match set_expr {
        SetExpr::Select(select) => {
            for table_with_joins in &select.from {
                validate_table_factor(&table_with_joins.relation)?;
                for join in &table_with_joins.joins {
                    validate_table_factor(&join.relation)?;
                }
            }

            if let Some(selection) = &select.selection {
                validate_expr(selection)?;
            }
        }
        SetExpr::Query(query) => validate_query_tree(query)?,
        SetExpr::SetOperation { left, right, .. } => {
            validate_set_expr(left)?;
            validate_set_expr(right)?;
        }
        SetExpr::Insert(_) | SetExpr::Update(_) => {
            anyhow::bail!("Data modification is not allowed inside queries")
        }
        _ => {}
    }

    Ok(())
}

fn validate_table_factor(table_factor: &TableFactor) -> anyhow::Result<()> {
    match table_factor {
        TableFactor::Derived { subquery, .. } => validate_query_tree(subquery)?,
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            validate_table_factor(&table_with_joins.relation)?;
            for join in &table_with_joins.joins {
                validate_table_factor(&join.relation)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn validate_expr(expr: &Expr) -> anyhow::Result<()> {
    match expr {
        Expr::Subquery(subquery) => validate_query_tree(subquery)?,
        Expr::InSubquery { subquery, .. } => validate_query_tree(subquery)?,
        Expr::Exists { subquery, .. } => validate_query_tree(subquery)?,
        Expr::BinaryOp { left, right, .. } => {
            validate_expr(left)?;
            validate_expr(right)?;
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => validate_expr(expr)?,
        _ => {}
    }

    Ok(())
}

/// Appends a LIMIT clause unless the query already carries one
fn apply_limit(query: &str, limit: usize) -> anyhow::Result<String> {
    let query_trimmed = strip_terminator(query);
    let limit_pattern = Regex::new(r"(?i)\bLIMIT\s+\d+")?;

    if limit_pattern.is_match(query_trimmed) {
        tracing::debug!("Query already has LIMIT clause, not adding another");
        Ok(query_trimmed.to_string())
    } else {
        Ok(format!("{} LIMIT {}", query_trimmed, limit))
    }
}
