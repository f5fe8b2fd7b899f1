//! Statement composition and execution.
//!
//! A [`Statement`] is a caller-supplied SQL prefix followed by clause
//! fragments. Values accumulate in the order fragments are pushed, which is
//! the textual order of their placeholders.
//!
//! # Example
//!
//! ```ignore
//! use recsql::statement;
//!
//! // INSERT INTO users (name, age, email) VALUES ($1, $2, $3) RETURNING id
//! let id: i64 = statement::insert_into("users", &input)?
//!     .returning("id")
//!     .fetch_scalar(&client)
//!     .await?;
//!
//! // UPDATE users SET age = $1 WHERE email = $2
//! let affected = statement::update("users", &changes, &filter)?
//!     .execute(&client)
//!     .await?;
//! ```

use crate::clause::{self, Clause, ClauseKind, Fragment};
use crate::client::GenericClient;
use crate::error::{RecError, RecResult};
use crate::record::Record;
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// Placeholder syntax used when rendering a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholders {
    /// Keep the builders' `?` / `?N` text as is.
    #[default]
    Question,
    /// Rewrite placeholders to `$1, $2, ...` in textual order (PostgreSQL).
    Dollar,
}

/// A composed SQL statement and its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Start a statement with a SQL prefix such as `INSERT INTO users`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            sql: prefix.into(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    ///
    /// Every `?` outside `'...'` or `"..."` counts as a placeholder for
    /// [`Statement::check_arity`] and is rewritten by [`Placeholders::Dollar`].
    /// The scanner does not understand `--` or `/* */` comments, `E'...'`
    /// escapes, dollar-quoted strings or the jsonb `?` / `?|` / `?&` operators;
    /// raw SQL containing any of these is miscounted.
    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a fragment and its values.
    pub fn push_fragment(&mut self, fragment: Fragment) -> &mut Self {
        let (sql, params) = fragment.into_parts();
        self.sql.push_str(&sql);
        self.params.extend(params);
        self
    }

    /// Append a clause; an empty clause appends nothing and binds nothing.
    pub fn push_clause(&mut self, clause: Clause) -> &mut Self {
        if let Clause::Present(fragment) = clause {
            self.push_fragment(fragment);
        }
        self
    }

    /// Append ` RETURNING <column>`.
    pub fn returning(mut self, column: &str) -> Self {
        self.sql.push_str(" RETURNING ");
        self.sql.push_str(column);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Fail with [`RecError::MismatchedArity`] if placeholders and values disagree.
    pub fn check_arity(&self) -> RecResult<()> {
        clause::check_arity(&self.sql, self.params.len())
    }

    /// Render the SQL text with the given placeholder syntax.
    pub fn render(&self, style: Placeholders) -> String {
        match style {
            Placeholders::Question => self.sql.clone(),
            Placeholders::Dollar => {
                let mut out = String::with_capacity(self.sql.len() + self.params.len());
                let mut last = 0;
                for (idx, span) in clause::placeholder_spans(&self.sql).into_iter().enumerate() {
                    out.push_str(&self.sql[last..span.start]);
                    out.push('$');
                    out.push_str(&(idx + 1).to_string());
                    last = span.end;
                }
                out.push_str(&self.sql[last..]);
                out
            }
        }
    }

    /// PostgreSQL form of the statement (`$N` placeholders).
    pub fn to_pg_sql(&self) -> String {
        self.render(Placeholders::Dollar)
    }

    /// Check arity, render for PostgreSQL, and log the statement.
    fn prepare(&self) -> RecResult<(String, Vec<&(dyn ToSql + Sync)>)> {
        self.check_arity()?;
        let sql = self.to_pg_sql();
        tracing::debug!(
            target: "recsql.sql",
            sql = %sql,
            params = ?self.params,
            "executing statement"
        );
        let params = self
            .params
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect();
        Ok((sql, params))
    }

    /// Execute and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> RecResult<u64> {
        let (sql, params) = self.prepare()?;
        conn.execute(&sql, &params).await
    }

    /// Execute and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> RecResult<Vec<Row>> {
        let (sql, params) = self.prepare()?;
        conn.query(&sql, &params).await
    }

    /// Execute and decode the first column of the first row.
    ///
    /// Pair with [`Statement::returning`] to read a generated identifier.
    pub async fn fetch_scalar<T>(&self, conn: &impl GenericClient) -> RecResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        let (sql, params) = self.prepare()?;
        let row = conn.query_one(&sql, &params).await?;
        row.try_get(0).map_err(|e| {
            let column = row
                .columns()
                .first()
                .map(|c| c.name().to_string())
                .unwrap_or_default();
            RecError::decode(column, e.to_string())
        })
    }
}

/// Ordered list of requested output names for a SELECT.
///
/// Entries are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `c1, c2, ...`, or [`RecError::EmptyClause`] when nothing was requested.
    pub fn to_sql(&self) -> RecResult<String> {
        if self.columns.is_empty() {
            return Err(RecError::empty_clause(ClauseKind::Projection));
        }
        Ok(self.columns.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// `INSERT INTO <table> (c1, ...) VALUES (?, ...)` over every field of `record`.
pub fn insert_into<R: Record + ?Sized>(table: &str, record: &R) -> RecResult<Statement> {
    let mut stmt = Statement::new(format!("INSERT INTO {table}"));
    stmt.push_fragment(clause::insert_fragment(record)?);
    Ok(stmt)
}

/// `UPDATE <table> SET ... WHERE ...`.
///
/// Both clauses are required: a record with nothing to set, or a filter with
/// no criteria, fails with [`RecError::EmptyClause`] rather than producing a
/// no-op or a full-table update.
pub fn update<C, F>(table: &str, changes: &C, filter: &F) -> RecResult<Statement>
where
    C: Record + ?Sized,
    F: Record + ?Sized,
{
    let set = clause::set_fragment(changes).require()?;
    let filter = clause::where_fragment(filter).require()?;

    let mut stmt = Statement::new(format!("UPDATE {table}"));
    stmt.push_fragment(set).push_fragment(filter);
    Ok(stmt)
}

/// `SELECT <projection> FROM <table>[ WHERE ...]`.
///
/// The WHERE clause is left out entirely when `filter` carries no criteria.
pub fn select<F: Record + ?Sized>(
    table: &str,
    projection: &Projection,
    filter: &F,
) -> RecResult<Statement> {
    let mut stmt = Statement::new(format!("SELECT {} FROM {table}", projection.to_sql()?));
    stmt.push_clause(clause::where_fragment(filter));
    Ok(stmt)
}
