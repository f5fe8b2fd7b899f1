//! Owned bind values.
//!
//! A [`Value`] is the untyped value read out of a record field. It is what the
//! clause builders pair with their placeholders, and it binds directly to a
//! `tokio_postgres` statement through [`ToSql`].

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// An untyped value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    Bool(bool),
    /// Any signed or small unsigned integer, widened to 64 bits.
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type label, used in bind errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
        }
    }

    /// Convert a JSON value into a bind value.
    ///
    /// Scalars map onto the matching variant; arrays and objects stay JSON.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

/// A [`Value`] variant bound to a column type it cannot encode as.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot bind {kind} value to a column of type {ty}")]
pub struct ColumnTypeMismatch {
    pub kind: &'static str,
    pub ty: Type,
}

type BindResult = Result<IsNull, Box<dyn std::error::Error + Sync + Send>>;

/// Encode `v` if its own `ToSql` accepts `ty`, otherwise report a mismatch for `value`.
fn bind<T: ToSql>(value: &Value, v: &T, ty: &Type, out: &mut BytesMut) -> BindResult {
    if !T::accepts(ty) {
        return Err(Box::new(ColumnTypeMismatch {
            kind: value.kind(),
            ty: ty.clone(),
        }));
    }
    v.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => bind(self, v, ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                _ => bind(self, v, ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                _ => bind(self, v, ty, out),
            },
            Value::Text(v) => match *ty {
                // Captured records carry uuids, timestamps and dates as strings.
                Type::UUID => Uuid::parse_str(v)?.to_sql(ty, out),
                Type::TIMESTAMPTZ => DateTime::parse_from_rfc3339(v)?
                    .with_timezone(&Utc)
                    .to_sql(ty, out),
                Type::TIMESTAMP => match DateTime::parse_from_rfc3339(v) {
                    Ok(at) => at.naive_utc().to_sql(ty, out),
                    Err(_) => v.parse::<NaiveDateTime>()?.to_sql(ty, out),
                },
                Type::DATE => v.parse::<NaiveDate>()?.to_sql(ty, out),
                _ => bind(self, v, ty, out),
            },
            Value::Bytes(v) => bind(self, v, ty, out),
            Value::Json(v) => bind(self, v, ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
                _ => bind(self, v, ty, out),
            },
            Value::Uuid(v) => bind(self, v, ty, out),
        }
    }

    // The variant decides; see `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Conversion from a record field into a [`Value`].
///
/// `#[derive(Record)]` calls this once per field. `Option<T>` maps `None` to
/// [`Value::Null`]; whether the field is an optional slot is tracked by the
/// record's descriptor table, not by the value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_to_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl ToValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Some(42_i32).to_value(), Value::Int(42));
        assert_eq!(None::<i32>.to_value(), Value::Null);
        assert_eq!(Some(Some("x")).to_value(), Value::Text("x".into()));
    }

    #[test]
    fn references_are_transparent() {
        let name = String::from("Alice");
        assert_eq!((&name).to_value(), Value::Text("Alice".into()));
        assert_eq!("Bob".to_value(), Value::Text("Bob".into()));
    }

    #[test]
    fn from_json_scalars() {
        assert_eq!(Value::from_json(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from_json(serde_json::json!("a")),
            Value::Text("a".into())
        );
        assert_eq!(
            Value::from_json(serde_json::json!([1, 2])),
            Value::Json(serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn int_narrows_to_column_width() {
        let mut buf = BytesMut::new();
        Value::Int(42).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &42_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn null_binds_as_null() {
        let mut buf = BytesMut::new();
        let is_null = Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    fn mismatch(value: Value, ty: Type) -> ColumnTypeMismatch {
        let mut buf = BytesMut::new();
        let err = value.to_sql_checked(&ty, &mut buf).err().expect("expected to_sql_checked to fail");
        assert!(buf.is_empty());
        err.downcast_ref::<ColumnTypeMismatch>()
            .cloned()
            .unwrap_or_else(|| panic!("unexpected error: {err}"))
    }

    #[test]
    fn rejects_mismatched_column_types() {
        let err = mismatch(Value::Text("abcd".into()), Type::INT4);
        assert_eq!(err.kind, "text");
        assert_eq!(err.ty, Type::INT4);

        assert_eq!(mismatch(Value::Float(1.5), Type::INT8).kind, "float");
        assert_eq!(mismatch(Value::Int(7), Type::TIMESTAMPTZ).kind, "int");
        assert_eq!(mismatch(Value::Bool(true), Type::TEXT).kind, "bool");
        assert_eq!(mismatch(Value::Uuid(Uuid::nil()), Type::TEXT).kind, "uuid");
        assert_eq!(
            mismatch(Value::Json(serde_json::json!({"a": 1})), Type::INT4).kind,
            "json"
        );
        assert_eq!(mismatch(Value::Bytes(vec![1]), Type::TEXT).kind, "bytes");

        let err = mismatch(Value::Text("abcd".into()), Type::INT4);
        assert_eq!(err.to_string(), "cannot bind text value to a column of type int4");
    }

    #[test]
    fn matching_column_types_bind() {
        let mut buf = BytesMut::new();
        Value::Int(7).to_sql_checked(&Type::INT8, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &7_i64.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Float(1.5).to_sql_checked(&Type::FLOAT8, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &1.5_f64.to_be_bytes());

        let mut buf = BytesMut::new();
        Value::Text("abcd".into())
            .to_sql_checked(&Type::VARCHAR, &mut buf)
            .unwrap();
        assert_eq!(buf.as_ref(), b"abcd");

        let mut buf = BytesMut::new();
        Value::Json(serde_json::json!({"a": 1}))
            .to_sql_checked(&Type::JSONB, &mut buf)
            .unwrap();
        assert!(!buf.is_empty());
    }

    #[test]
    fn text_coerces_to_timestamps_and_dates() {
        let at = DateTime::parse_from_rfc3339("2024-05-06T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);

        let mut expected = BytesMut::new();
        at.to_sql(&Type::TIMESTAMPTZ, &mut expected).unwrap();
        let mut buf = BytesMut::new();
        Value::Text("2024-05-06T07:08:09Z".into())
            .to_sql_checked(&Type::TIMESTAMPTZ, &mut buf)
            .unwrap();
        assert_eq!(buf, expected);

        let mut expected = BytesMut::new();
        at.naive_utc().to_sql(&Type::TIMESTAMP, &mut expected).unwrap();
        for text in ["2024-05-06T07:08:09Z", "2024-05-06T07:08:09"] {
            let mut buf = BytesMut::new();
            Value::Text(text.into())
                .to_sql_checked(&Type::TIMESTAMP, &mut buf)
                .unwrap();
            assert_eq!(buf, expected, "{text}");
        }

        let mut buf = BytesMut::new();
        Value::Timestamp(at)
            .to_sql_checked(&Type::TIMESTAMP, &mut buf)
            .unwrap();
        assert_eq!(buf, expected);

        let mut expected = BytesMut::new();
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .to_sql(&Type::DATE, &mut expected)
            .unwrap();
        let mut buf = BytesMut::new();
        Value::Text("2024-05-06".into())
            .to_sql_checked(&Type::DATE, &mut buf)
            .unwrap();
        assert_eq!(buf, expected);

        let mut buf = BytesMut::new();
        assert!(
            Value::Text("not a date".into())
                .to_sql_checked(&Type::DATE, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn text_coerces_to_uuid() {
        let id = Uuid::new_v4();
        let mut buf = BytesMut::new();
        Value::Text(id.to_string())
            .to_sql(&Type::UUID, &mut buf)
            .unwrap();
        assert_eq!(buf.as_ref(), id.as_bytes());
    }
}
