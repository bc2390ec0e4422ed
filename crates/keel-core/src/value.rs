//! Driver-neutral bind values.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Column type of a bind value.
///
/// A `NULL` keeps its kind so backends with strict parameter typing
/// (PostgreSQL) receive a parameter of the column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
}

/// Rust types with a fixed [`SqlKind`].
pub trait SqlTyped {
    const KIND: SqlKind;
}

macro_rules! sql_typed {
    ($kind:ident: $($ty:ty),+) => {
        $(impl SqlTyped for $ty {
            const KIND: SqlKind = SqlKind::$kind;
        })+
    };
}

sql_typed!(Bool: bool);
sql_typed!(Int: i16, i32, i64, u32);
sql_typed!(Float: f32, f64);
sql_typed!(Text: String, &str, &String, Uuid);
sql_typed!(Bytes: Vec<u8>);

/// A value bound into a SQL statement.
///
/// The variants cover the types the `sqlx` `Any` driver can encode on
/// every backend. Entity ids and column values are converted into this
/// type before they reach the persistence context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL `NULL` of the given column type.
    Null(SqlKind),
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary blob.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Returns the column type of this value.
    #[must_use]
    pub const fn kind(&self) -> SqlKind {
        match self {
            Self::Null(kind) => *kind,
            Self::Bool(_) => SqlKind::Bool,
            Self::Int(_) => SqlKind::Int,
            Self::Float(_) => SqlKind::Float,
            Self::Text(_) => SqlKind::Text,
            Self::Bytes(_) => SqlKind::Bytes,
        }
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(_) => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

// Stored as CHAR(36) so the same column works on every backend.
impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<SqlValue> + SqlTyped> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null(T::KIND), Into::into)
    }
}
