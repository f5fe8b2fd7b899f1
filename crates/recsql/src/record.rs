//! Field introspection over records.
//!
//! A [`Record`] exposes a per-type descriptor table ([`FieldDef`]) and, per
//! call, the current field values in the same order. `#[derive(Record)]`
//! generates both; [`Snapshot`](crate::Snapshot) provides them for any
//! `serde::Serialize` struct.
//!
//! # Example
//!
//! ```ignore
//! use recsql::Record;
//!
//! #[derive(Record)]
//! struct UserFilter {
//!     name: String,
//!     age: Option<i32>,
//!     email: Option<String>,
//! }
//!
//! let f = UserFilter { name: "Alice".into(), age: Some(42), email: None };
//! assert_eq!(recsql::record::fields(&f), ["name", "age", "email"]);
//! ```

use crate::value::Value;
use std::borrow::Cow;

/// How a field stores its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Always holds a value; never a SET/WHERE criterion.
    Plain,
    /// `Option<T>`: holding a value marks the field as set.
    Optional,
}

/// Static description of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field identifier as declared (or serialized).
    pub name: &'static str,
    /// Normalized column identifier.
    pub column: Cow<'static, str>,
    pub slot: SlotKind,
}

impl FieldDef {
    /// Descriptor with a precomputed column name (usable in `const` tables).
    pub const fn new(name: &'static str, column: &'static str, slot: SlotKind) -> Self {
        Self {
            name,
            column: Cow::Borrowed(column),
            slot,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.slot == SlotKind::Optional
    }
}

/// A typed value with a fixed, ordered set of named fields.
pub trait Record {
    /// Field descriptors in declaration order.
    fn field_defs(&self) -> &[FieldDef];

    /// Current field values, one per descriptor and in the same order.
    ///
    /// `None` marks an optional slot that is empty. Plain fields are always
    /// `Some`, even when the value itself is [`Value::Null`].
    fn field_values(&self) -> Vec<Option<Value>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field_defs(&self) -> &[FieldDef] {
        (**self).field_defs()
    }

    fn field_values(&self) -> Vec<Option<Value>> {
        (**self).field_values()
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn field_defs(&self) -> &[FieldDef] {
        (**self).field_defs()
    }

    fn field_values(&self) -> Vec<Option<Value>> {
        (**self).field_values()
    }
}

/// Transient view of one field, derived per call.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub def: &'a FieldDef,
    /// `true` only for an empty optional slot.
    pub is_null: bool,
    pub value: Value,
}

impl Field<'_> {
    pub fn name(&self) -> &str {
        self.def.name
    }

    pub fn column(&self) -> &str {
        &self.def.column
    }

    pub fn is_optional(&self) -> bool {
        self.def.is_optional()
    }

    /// Whether this field takes part in a SET or WHERE clause.
    pub fn participates(&self) -> bool {
        self.is_optional() && !self.is_null
    }
}

/// Field names in declaration order.
pub fn fields<R: Record + ?Sized>(record: &R) -> Vec<&str> {
    record.field_defs().iter().map(|d| d.name).collect()
}

/// All field values in declaration order; empty optional slots yield [`Value::Null`].
pub fn values<R: Record + ?Sized>(record: &R) -> Vec<Value> {
    record
        .field_values()
        .into_iter()
        .map(|v| v.unwrap_or(Value::Null))
        .collect()
}

/// Field descriptors paired with their current values.
pub fn describe<R: Record + ?Sized>(record: &R) -> Vec<Field<'_>> {
    let defs = record.field_defs();
    let values = record.field_values();
    debug_assert_eq!(defs.len(), values.len(), "one value per field descriptor");

    defs.iter()
        .zip(values)
        .map(|(def, value)| Field {
            def,
            is_null: value.is_none(),
            value: value.unwrap_or(Value::Null),
        })
        .collect()
}
