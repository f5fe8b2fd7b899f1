use super::{ClauseKind, Fragment};
use crate::error::{RecError, RecResult};
use crate::record::{Record, values};

/// Build `" (c1, c2, ...) VALUES (?, ?, ...)"` over every field of `record`.
///
/// Optionality is ignored: empty optional slots are inserted as NULL. The
/// fragment is meant to follow an `INSERT INTO <table>` prefix.
///
/// A record without fields fails with [`RecError::EmptyClause`] instead of
/// producing a `VALUES ()` list.
pub fn insert_fragment<R: Record + ?Sized>(record: &R) -> RecResult<Fragment> {
    let defs = record.field_defs();
    if defs.is_empty() {
        return Err(RecError::empty_clause(ClauseKind::Insert));
    }

    let columns = defs
        .iter()
        .map(|d| d.column.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; defs.len()].join(", ");

    let sql = format!(" ({columns}) VALUES ({placeholders})");
    Ok(Fragment::new(sql, values(record)))
}
