use super::{Clause, ClauseKind, numbered_assignments};
use crate::record::Record;

/// Build `" SET c1 = ?1, c2 = ?2, ..."` from the filled optional fields of `record`.
///
/// Plain fields and empty optional slots are skipped and do not consume a
/// placeholder number. Returns [`Clause::Empty`] when nothing is set; an UPDATE
/// must not be issued in that case.
pub fn set_fragment<R: Record + ?Sized>(record: &R) -> Clause {
    numbered_assignments(record, ClauseKind::Set, " SET ", ", ")
}
