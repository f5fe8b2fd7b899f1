use super::{Clause, ClauseKind, numbered_assignments};
use crate::record::Record;

/// Build `" WHERE c1 = ?1 AND c2 = ?2 ..."` from the filled optional fields of `record`.
///
/// Returns [`Clause::Empty`] when the record carries no criteria. The caller
/// then leaves the WHERE keyword out and binds no filter values.
pub fn where_fragment<R: Record + ?Sized>(record: &R) -> Clause {
    numbered_assignments(record, ClauseKind::Where, " WHERE ", " AND ")
}
