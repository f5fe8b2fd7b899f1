//! # recsql
//!
//! Turn a partially-populated input or filter record into parameterized SQL
//! fragments, without hand-written SQL per entity.
//!
//! ## Conventions
//!
//! - **Field order is declaration order**, and every builder honors it.
//! - **`Option<T>` fields are criteria**: a field takes part in a SET or WHERE
//!   clause only when it is an `Option` holding a value. Plain fields never do.
//! - **INSERT takes every field**, set or not.
//! - **Column names** are the snake_case form of the field name (`UserName` -> `user_name`).
//! - **Values travel with their SQL**: each builder returns the values for its
//!   own placeholders, so placeholder and value counts always agree.
//!
//! ## Example
//!
//! ```ignore
//! use recsql::{Record, insert_fragment, set_fragment, where_fragment};
//!
//! #[derive(Record)]
//! struct UserInput {
//!     name: String,
//!     age: Option<i32>,
//!     email: Option<String>,
//! }
//!
//! let input = UserInput { name: "Alice".into(), age: Some(42), email: None };
//!
//! assert_eq!(insert_fragment(&input)?.sql(), " (name, age, email) VALUES (?, ?, ?)");
//! assert_eq!(set_fragment(&input).sql(), " SET age = ?1");
//! assert_eq!(where_fragment(&input).sql(), " WHERE age = ?1");
//! # Ok::<(), recsql::RecError>(())
//! ```

pub mod capture;
pub mod clause;
pub mod client;
pub mod error;
pub mod naming;
pub mod record;
pub mod statement;
pub mod value;

pub use capture::Snapshot;
pub use clause::{
    Clause, ClauseKind, Fragment, check_arity, insert_fragment, placeholder_count, set_fragment,
    values_for, where_fragment,
};
pub use client::GenericClient;
pub use error::{RecError, RecResult};
pub use naming::normalize;
pub use record::{Field, FieldDef, Record, SlotKind};
pub use statement::{Placeholders, Projection, Statement};
pub use value::{ColumnTypeMismatch, ToValue, Value};

#[cfg(feature = "derive")]
pub use recsql_derive::Record;
