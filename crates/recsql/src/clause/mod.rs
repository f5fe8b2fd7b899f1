//! Record-driven clause builders.
//!
//! Each builder reads a [`Record`], decides which fields take part, and returns
//! the SQL text together with the values for its placeholders:
//!
//! - [`insert_fragment`]: `" (c1, c2) VALUES (?, ?)"`, every field takes part
//! - [`set_fragment`]: `" SET c1 = ?1, c2 = ?2"`, only filled optional fields
//! - [`where_fragment`]: `" WHERE c1 = ?1 AND c2 = ?2"`, only filled optional fields
//!
//! The numbered `?N` tags are per-builder and purely descriptive. Values are
//! bound in the textual order their placeholders appear, so a SET fragment
//! followed by a WHERE fragment binds the SET values first.
//!
//! # Example
//!
//! ```ignore
//! use recsql::{Record, set_fragment, where_fragment};
//!
//! let mut stmt = recsql::Statement::new("UPDATE users");
//! stmt.push_fragment(set_fragment(&changes).require()?)
//!     .push_fragment(where_fragment(&filter).require()?);
//! ```

mod insert;
mod update;
mod where_clause;


pub use insert::insert_fragment;
pub use update::set_fragment;
pub use where_clause::where_fragment;

use crate::error::{RecError, RecResult};
use crate::record::{Record, describe};
use crate::value::Value;
use std::fmt;
use std::ops::Range;

/// Which clause a fragment or value sequence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Insert,
    Set,
    Where,
    /// SELECT output column list.
    Projection,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClauseKind::Insert => "INSERT",
            ClauseKind::Set => "SET",
            ClauseKind::Where => "WHERE",
            ClauseKind::Projection => "projection",
        })
    }
}

/// SQL text plus the values bound to its placeholders, in order.
///
/// The number of placeholders in `sql` always equals `params.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    sql: String,
    params: Vec<Value>,
}

impl Fragment {
    /// Builder-internal constructor; callers go through [`Fragment::from_parts`].
    pub(crate) fn new(sql: String, params: Vec<Value>) -> Self {
        debug_assert_eq!(placeholder_count(&sql), params.len());
        Self { sql, params }
    }

    /// Build a fragment from hand-written SQL, checking placeholder arity.
    pub fn from_parts(sql: impl Into<String>, params: Vec<Value>) -> RecResult<Self> {
        let sql = sql.into();
        check_arity(&sql, params.len())?;
        Ok(Self { sql, params })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Outcome of a SET or WHERE builder.
///
/// An empty clause is an explicit state: rendering it yields `""`, and
/// [`Clause::require`] turns it into [`RecError::EmptyClause`].
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an empty WHERE clause turns a targeted statement into a full-table one"]
pub enum Clause {
    /// No field took part.
    Empty(ClauseKind),
    Present(Fragment),
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        matches!(self, Clause::Empty(_))
    }

    /// Clause text, or `""` when empty.
    pub fn sql(&self) -> &str {
        match self {
            Clause::Empty(_) => "",
            Clause::Present(f) => f.sql(),
        }
    }

    /// Bound values, empty when the clause is empty.
    pub fn params(&self) -> &[Value] {
        match self {
            Clause::Empty(_) => &[],
            Clause::Present(f) => f.params(),
        }
    }

    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            Clause::Empty(_) => None,
            Clause::Present(f) => Some(f),
        }
    }

    /// Return the fragment, or [`RecError::EmptyClause`] if no field took part.
    pub fn require(self) -> RecResult<Fragment> {
        match self {
            Clause::Empty(kind) => Err(RecError::empty_clause(kind)),
            Clause::Present(f) => Ok(f),
        }
    }
}

/// Values for the placeholders the `kind` builder emits for `record`.
///
/// INSERT takes every field value; SET and WHERE take only filled optional
/// fields, in the order their placeholders are numbered.
pub fn values_for<R: Record + ?Sized>(record: &R, kind: ClauseKind) -> Vec<Value> {
    match kind {
        ClauseKind::Insert => crate::record::values(record),
        ClauseKind::Set | ClauseKind::Where => participating(record)
            .into_iter()
            .map(|(_, value)| value)
            .collect(),
        ClauseKind::Projection => Vec::new(),
    }
}

/// Filled optional fields as `(column, value)`, in declaration order.
pub(crate) fn participating<R: Record + ?Sized>(record: &R) -> Vec<(String, Value)> {
    describe(record)
        .into_iter()
        .filter(|f| f.participates())
        .map(|f| (f.column().to_string(), f.value))
        .collect()
}

/// Shared body of the SET and WHERE builders: `<prefix><col> = ?1<sep><col> = ?2...`.
pub(crate) fn numbered_assignments<R: Record + ?Sized>(
    record: &R,
    kind: ClauseKind,
    prefix: &str,
    separator: &str,
) -> Clause {
    let fields = participating(record);
    if fields.is_empty() {
        tracing::trace!(target: "recsql.sql", clause = %kind, "no participating fields");
        return Clause::Empty(kind);
    }

    let mut sql = String::from(prefix);
    let mut params = Vec::with_capacity(fields.len());
    for (idx, (column, value)) in fields.into_iter().enumerate() {
        if idx > 0 {
            sql.push_str(separator);
        }
        sql.push_str(&column);
        sql.push_str(" = ?");
        sql.push_str(&(idx + 1).to_string());
        params.push(value);
    }

    Clause::Present(Fragment::new(sql, params))
}

/// Byte ranges of every placeholder (`?` or `?N`) outside quoted text.
///
/// Only single- and double-quoted text is skipped. Comments, `E''` escapes,
/// dollar quoting and jsonb `?` operators are not recognized.
pub(crate) fn placeholder_spans(sql: &str) -> Vec<Range<usize>> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            // A doubled quote inside quoted text is an escape and keeps us inside.
            Some(q) if b == q => {
                if bytes.get(i + 1) == Some(&q) {
                    i += 1;
                } else {
                    quote = None;
                }
            }
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None if b == b'?' => {
                let start = i;
                while bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                }
                spans.push(start..i + 1);
            }
            None => {}
        }
        i += 1;
    }

    spans
}

/// Number of placeholders in `sql`, with the same limits as [`Statement::push_sql`](crate::Statement::push_sql).
pub fn placeholder_count(sql: &str) -> usize {
    placeholder_spans(sql).len()
}

/// Fail with [`RecError::MismatchedArity`] unless `sql` has exactly `values` placeholders.
pub fn check_arity(sql: &str, values: usize) -> RecResult<()> {
    let placeholders = placeholder_count(sql);
    if placeholders != values {
        return Err(RecError::MismatchedArity {
            placeholders,
            values,
        });
    }
    Ok(())
}
