//! Runtime records captured from `serde::Serialize` values.
//!
//! [`Snapshot::capture`] walks a value through a small serializer that only
//! accepts structs with named fields. Field order follows serialization order
//! (declaration order for derived `Serialize`), field names are the serialized
//! names, and `Option` fields are detected through `serialize_some`/`serialize_none`.
//!
//! # Example
//!
//! ```ignore
//! #[derive(serde::Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct UserFilter {
//!     user_name: Option<String>,
//!     site_id: Option<i64>,
//! }
//!
//! let filter = UserFilter { user_name: None, site_id: Some(3) };
//! let snap = recsql::Snapshot::capture(&filter)?;
//! let clause = recsql::where_fragment(&snap);
//! assert_eq!(clause.sql(), " WHERE site_id = ?1");
//! # Ok::<(), recsql::RecError>(())
//! ```

use crate::error::{RecError, RecResult};
use crate::naming::normalize;
use crate::record::{FieldDef, Record, SlotKind};
use crate::value::Value;
use serde::Serialize;
use serde::ser::{self, Impossible};
use std::borrow::Cow;
use std::fmt;

/// A record captured at runtime from a serializable struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    defs: Vec<FieldDef>,
    values: Vec<Option<Value>>,
}

impl Snapshot {
    /// Capture the fields of `value`.
    ///
    /// One level of wrapping (`Some(record)` or a newtype struct) is followed.
    /// Anything that does not end in a struct with named fields fails with
    /// [`RecError::InvalidRecordKind`].
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> RecResult<Self> {
        value.serialize(RecordSerializer { unwrapped: false })
    }

    /// Number of captured fields.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Record for Snapshot {
    fn field_defs(&self) -> &[FieldDef] {
        &self.defs
    }

    fn field_values(&self) -> Vec<Option<Value>> {
        self.values.clone()
    }
}

/// Serializer accepting only a struct with named fields at the top level.
struct RecordSerializer {
    unwrapped: bool,
}

impl RecordSerializer {
    fn follow<T: Serialize + ?Sized>(self, value: &T) -> RecResult<Snapshot> {
        if self.unwrapped {
            return Err(RecError::invalid_record_kind("nested wrapper"));
        }
        value.serialize(RecordSerializer { unwrapped: true })
    }
}

macro_rules! reject {
    ($($method:ident($($arg:ty),*) => $kind:literal;)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> RecResult<Self::Ok> {
                Err(RecError::invalid_record_kind($kind))
            }
        )*
    };
}

impl ser::Serializer for RecordSerializer {
    type Ok = Snapshot;
    type Error = RecError;
    type SerializeSeq = Impossible<Snapshot, RecError>;
    type SerializeTuple = Impossible<Snapshot, RecError>;
    type SerializeTupleStruct = Impossible<Snapshot, RecError>;
    type SerializeTupleVariant = Impossible<Snapshot, RecError>;
    type SerializeMap = Impossible<Snapshot, RecError>;
    type SerializeStruct = SnapshotBuilder;
    type SerializeStructVariant = Impossible<Snapshot, RecError>;

    reject! {
        serialize_bool(bool) => "bool";
        serialize_i8(i8) => "integer";
        serialize_i16(i16) => "integer";
        serialize_i32(i32) => "integer";
        serialize_i64(i64) => "integer";
        serialize_i128(i128) => "integer";
        serialize_u8(u8) => "integer";
        serialize_u16(u16) => "integer";
        serialize_u32(u32) => "integer";
        serialize_u64(u64) => "integer";
        serialize_u128(u128) => "integer";
        serialize_f32(f32) => "float";
        serialize_f64(f64) => "float";
        serialize_char(char) => "char";
        serialize_str(&str) => "string";
        serialize_bytes(&[u8]) => "bytes";
        serialize_none() => "none";
        serialize_unit() => "unit";
        serialize_unit_struct(&'static str) => "unit struct";
        serialize_unit_variant(&'static str, u32, &'static str) => "enum";
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> RecResult<Snapshot> {
        self.follow(value)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> RecResult<Snapshot> {
        self.follow(value)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> RecResult<Snapshot> {
        Err(RecError::invalid_record_kind("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> RecResult<Self::SerializeSeq> {
        Err(RecError::invalid_record_kind("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> RecResult<Self::SerializeTuple> {
        Err(RecError::invalid_record_kind("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> RecResult<Self::SerializeTupleStruct> {
        Err(RecError::invalid_record_kind("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> RecResult<Self::SerializeTupleVariant> {
        Err(RecError::invalid_record_kind("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> RecResult<Self::SerializeMap> {
        Err(RecError::invalid_record_kind("map"))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> RecResult<SnapshotBuilder> {
        Ok(SnapshotBuilder {
            defs: Vec::with_capacity(len),
            values: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> RecResult<Self::SerializeStructVariant> {
        Err(RecError::invalid_record_kind("enum"))
    }
}

struct SnapshotBuilder {
    defs: Vec<FieldDef>,
    values: Vec<Option<Value>>,
}

impl ser::SerializeStruct for SnapshotBuilder {
    type Ok = Snapshot;
    type Error = RecError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> RecResult<()> {
        let state = value.serialize(SlotProbe).unwrap_or(SlotState::Plain);
        let json = serde_json::to_value(value)
            .map_err(|e| RecError::Serialization(format!("field `{key}`: {e}")))?;
        let value = Value::from_json(json);

        let (slot, value) = match state {
            SlotState::Plain => (SlotKind::Plain, Some(value)),
            SlotState::Filled => (SlotKind::Optional, Some(value)),
            SlotState::Empty => (SlotKind::Optional, None),
        };
        self.defs.push(FieldDef {
            name: key,
            column: Cow::Owned(normalize(key)),
            slot,
        });
        self.values.push(value);
        Ok(())
    }

    /// `skip_serializing_if` omitted the field; keep its column as an empty slot.
    fn skip_field(&mut self, key: &'static str) -> RecResult<()> {
        self.defs.push(FieldDef {
            name: key,
            column: Cow::Owned(normalize(key)),
            slot: SlotKind::Optional,
        });
        self.values.push(None);
        Ok(())
    }

    fn end(self) -> RecResult<Snapshot> {
        Ok(Snapshot {
            defs: self.defs,
            values: self.values,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Plain,
    Empty,
    Filled,
}

/// Compound field values short-circuit through this error; they are plain.
#[derive(Debug)]
struct Compound;

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("compound value")
    }
}

impl std::error::Error for Compound {}

impl ser::Error for Compound {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Compound
    }
}

/// Classifies a field value as plain, empty optional or filled optional.
struct SlotProbe;

macro_rules! plain {
    ($($method:ident($($arg:ty),*);)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<SlotState, Compound> {
                Ok(SlotState::Plain)
            }
        )*
    };
}

impl ser::Serializer for SlotProbe {
    type Ok = SlotState;
    type Error = Compound;
    type SerializeSeq = Impossible<SlotState, Compound>;
    type SerializeTuple = Impossible<SlotState, Compound>;
    type SerializeTupleStruct = Impossible<SlotState, Compound>;
    type SerializeTupleVariant = Impossible<SlotState, Compound>;
    type SerializeMap = Impossible<SlotState, Compound>;
    type SerializeStruct = Impossible<SlotState, Compound>;
    type SerializeStructVariant = Impossible<SlotState, Compound>;

    plain! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_char(char);
        serialize_str(&str);
        serialize_bytes(&[u8]);
        serialize_unit();
        serialize_unit_struct(&'static str);
        serialize_unit_variant(&'static str, u32, &'static str);
    }

    fn serialize_none(self) -> Result<SlotState, Compound> {
        Ok(SlotState::Empty)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<SlotState, Compound> {
        Ok(SlotState::Filled)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<SlotState, Compound> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<SlotState, Compound> {
        Ok(SlotState::Plain)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Compound> {
        Err(Compound)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Compound> {
        Err(Compound)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Compound> {
        Err(Compound)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Compound> {
        Err(Compound)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Compound> {
        Err(Compound)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Compound> {
        Err(Compound)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Compound> {
        Err(Compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct CreateUserInput {
        name: String,
        age: Option<i32>,
        email: Option<String>,
    }

    #[derive(Serialize)]
    struct Wrapper(CreateUserInput);

    fn alice() -> CreateUserInput {
        CreateUserInput {
            name: "Alice".into(),
            age: Some(42),
            email: None,
        }
    }

    #[test]
    fn captures_fields_in_declaration_order() {
        let snap = Snapshot::capture(&alice()).unwrap();
        assert_eq!(record::fields(&snap), ["Name", "Age", "Email"]);
        let columns: Vec<_> = snap.field_defs().iter().map(|d| d.column.as_ref()).collect();
        assert_eq!(columns, ["name", "age", "email"]);
        assert_eq!(
            record::values(&snap),
            [Value::Text("Alice".into()), Value::Int(42), Value::Null]
        );
    }

    #[test]
    fn detects_optional_slots() {
        let snap = Snapshot::capture(&alice()).unwrap();
        let slots: Vec<_> = snap.field_defs().iter().map(|d| d.slot).collect();
        assert_eq!(
            slots,
            [SlotKind::Plain, SlotKind::Optional, SlotKind::Optional]
        );
        assert_eq!(snap.field_values()[2], None);
    }

    #[test]
    fn follows_one_wrapper() {
        let input = alice();
        assert_eq!(Snapshot::capture(&&input).unwrap().len(), 3);
        assert_eq!(Snapshot::capture(&Some(alice())).unwrap().len(), 3);
        assert_eq!(Snapshot::capture(&Wrapper(alice())).unwrap().len(), 3);
    }

    #[test]
    fn skipped_fields_keep_their_column() {
        #[derive(Serialize)]
        struct NewUser {
            name: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            email: Option<String>,
        }

        let snap = Snapshot::capture(&NewUser {
            name: "a".into(),
            email: None,
        })
        .unwrap();
        assert_eq!(record::fields(&snap), ["name", "email"]);
        assert_eq!(snap.field_defs()[1].slot, SlotKind::Optional);
        assert_eq!(snap.field_values()[1], None);

        let insert = crate::clause::insert_fragment(&snap).unwrap();
        assert_eq!(insert.sql(), " (name, email) VALUES (?, ?)");
        assert_eq!(insert.params(), &[Value::Text("a".into()), Value::Null]);
        assert!(crate::clause::where_fragment(&snap).is_empty());
    }

    #[test]
    fn rejects_nested_wrappers() {
        let err = Snapshot::capture(&Some(Wrapper(alice()))).unwrap_err();
        assert!(err.is_invalid_record_kind());
    }

    #[test]
    fn rejects_non_records() {
        for err in [
            Snapshot::capture(&42_i32).unwrap_err(),
            Snapshot::capture("Alice").unwrap_err(),
            Snapshot::capture(&vec![1, 2, 3]).unwrap_err(),
            Snapshot::capture(&BTreeMap::from([("Name", "Alice")])).unwrap_err(),
            Snapshot::capture(&None::<CreateUserInput>).unwrap_err(),
            Snapshot::capture(&(1, 2)).unwrap_err(),
        ] {
            assert!(err.is_invalid_record_kind(), "unexpected error: {err}");
        }
    }

    #[test]
    fn composite_fields_become_json() {
        #[derive(Serialize)]
        struct Filter {
            tags: Option<Vec<String>>,
            meta: BTreeMap<String, i32>,
        }

        let snap = Snapshot::capture(&Filter {
            tags: Some(vec!["a".into()]),
            meta: BTreeMap::from([("k".to_string(), 1)]),
        })
        .unwrap();
        let defs = snap.field_defs();
        assert_eq!(defs[0].slot, SlotKind::Optional);
        assert_eq!(defs[1].slot, SlotKind::Plain);
        assert_eq!(
            record::values(&snap),
            [
                Value::Json(serde_json::json!(["a"])),
                Value::Json(serde_json::json!({"k": 1}))
            ]
        );
    }
}
