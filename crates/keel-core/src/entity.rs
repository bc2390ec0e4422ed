//! Entity mapping metadata.

use crate::SqlValue;
use sqlx::any::AnyRow;
use sqlx::FromRow;
use std::fmt;

/// An identity-bearing record managed by the persistence layer.
///
/// Implementors declare their table mapping explicitly. `COLUMNS` lists
/// every mapped column (the id column included) in the order that
/// [`Entity::values`] returns them.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, sqlx::FromRow)]
/// struct Book { id: i64, title: String }
///
/// impl Entity for Book {
///     type Id = i64;
///     const TABLE: &'static str = "books";
///     const ID_COLUMN: &'static str = "id";
///     const COLUMNS: &'static [&'static str] = &["id", "title"];
///     fn id(&self) -> i64 { self.id }
///     fn values(&self) -> Vec<SqlValue> {
///         vec![self.id.into(), self.title.clone().into()]
///     }
/// }
/// ```
pub trait Entity: for<'r> FromRow<'r, AnyRow> + Clone + Send + Sync + Unpin + 'static {
    /// Identity type.
    type Id: Clone + fmt::Debug + Into<SqlValue> + Send + Sync + 'static;

    /// Table name.
    const TABLE: &'static str;

    /// Primary key column.
    const ID_COLUMN: &'static str;

    /// Mapped columns, id column included.
    const COLUMNS: &'static [&'static str];

    /// Returns this entity's identity.
    fn id(&self) -> Self::Id;

    /// Returns the column values in `COLUMNS` order.
    fn values(&self) -> Vec<SqlValue>;
}

/// Table mapping of one entity type, resolved once per DAO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Short type name, used in log lines.
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// Primary key column.
    pub id_column: &'static str,
    /// Mapped columns, id column included.
    pub columns: &'static [&'static str],
}

impl EntityDescriptor {
    /// Builds the descriptor for `E`.
    #[must_use]
    pub fn of<E: Entity>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<E>()),
            table: E::TABLE,
            id_column: E::ID_COLUMN,
            columns: E::COLUMNS,
        }
    }

    /// Returns the mapped columns other than the id column.
    pub fn non_id_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .copied()
            .filter(move |c| *c != self.id_column)
    }
}

impl fmt::Display for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.table)
    }
}

/// Strips the module path, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
