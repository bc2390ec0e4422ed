//! SQLx-backed persistence context.

use super::{entity_values, PersistenceContext};
use crate::SqlDialect;
use async_trait::async_trait;
use keel_core::{Entity, EntityDescriptor, KeelError, KeelResult, SqlKind, SqlValue};
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;
use sqlx::Transaction;
use tracing::{debug, warn};

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Insert,
    Merge,
    Delete,
}

/// A write scheduled for the next flush.
#[derive(Debug)]
struct PendingWrite {
    kind: WriteKind,
    descriptor: EntityDescriptor,
    id: SqlValue,
    values: Vec<SqlValue>,
}

/// A unit of work over one database transaction.
///
/// `persist`, `merge` and `remove` are queued and executed on
/// [`flush`](PersistenceContext::flush), before any read, or on
/// [`commit`](Self::commit). Dropping a session without committing rolls
/// the transaction back.
///
/// A failed flush marks the session rollback-only: the failed write and
/// everything queued after it stay pending, and every later flush, read or
/// commit returns [`KeelError::RollbackOnly`].
pub struct SqlSession {
    tx: Transaction<'static, Any>,
    dialect: SqlDialect,
    pending: Vec<PendingWrite>,
    rollback_only: Option<String>,
    log_queries: bool,
}

impl SqlSession {
    /// Wraps an open transaction.
    #[must_use]
    pub fn new(tx: Transaction<'static, Any>, dialect: SqlDialect, log_queries: bool) -> Self {
        Self {
            tx,
            dialect,
            pending: Vec::new(),
            rollback_only: None,
            log_queries,
        }
    }

    /// Returns the dialect statements are rendered in.
    #[must_use]
    pub const fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Returns the number of writes waiting for the next flush.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Returns true once a flush has failed in this session.
    #[must_use]
    pub const fn is_rollback_only(&self) -> bool {
        self.rollback_only.is_some()
    }

    /// Flushes pending writes and commits the transaction.
    ///
    /// If the flush fails the transaction is rolled back and the flush
    /// error is returned.
    pub async fn commit(mut self) -> KeelResult<()> {
        if let Err(e) = self.flush().await {
            self.pending.clear();
            if let Err(rollback_err) = self.tx.rollback().await {
                warn!("Rollback after failed flush also failed: {}", rollback_err);
            }
            return Err(e);
        }
        self.tx.commit().await?;
        debug!("Session committed");
        Ok(())
    }

    /// Discards pending writes and rolls the transaction back.
    pub async fn rollback(mut self) -> KeelResult<()> {
        let discarded = self.pending.len();
        self.pending.clear();
        self.tx.rollback().await?;
        debug!(discarded, "Session rolled back");
        Ok(())
    }

    /// Runs a raw statement inside this session's transaction.
    ///
    /// Pending writes are flushed first. Intended for schema setup and
    /// other statements outside the entity mapping.
    pub async fn execute_raw(&mut self, sql: &str) -> KeelResult<u64> {
        self.flush().await?;
        self.log_statement(sql);
        let result = sqlx::query(sql).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    fn log_statement(&self, sql: &str) {
        if self.log_queries {
            debug!(dialect = %self.dialect, sql, "Executing statement");
        }
    }

    fn select_sql(&self, descriptor: &EntityDescriptor) -> String {
        format!("SELECT {} FROM {}", descriptor.columns.join(", "), descriptor.table)
    }

    fn id_predicate(&self, descriptor: &EntityDescriptor, index: usize) -> String {
        format!("{} = {}", descriptor.id_column, self.dialect.placeholder(index))
    }

    async fn exists_row(&mut self, descriptor: &EntityDescriptor, id: &SqlValue) -> KeelResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {}",
            descriptor.table,
            self.id_predicate(descriptor, 1)
        );
        self.log_statement(&sql);
        let row = bind_value(sqlx::query(&sql), id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_row(&mut self, descriptor: &EntityDescriptor, values: &[SqlValue]) -> KeelResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            descriptor.table,
            descriptor.columns.join(", "),
            self.dialect.placeholders(1, values.len())
        );
        self.log_statement(&sql);
        let query = values.iter().fold(sqlx::query(&sql), bind_value);
        query.execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn update_row(
        &mut self,
        descriptor: &EntityDescriptor,
        id: &SqlValue,
        values: &[SqlValue],
    ) -> KeelResult<()> {
        let assigned: Vec<&SqlValue> = descriptor
            .columns
            .iter()
            .zip(values)
            .filter(|(column, _)| **column != descriptor.id_column)
            .map(|(_, value)| value)
            .collect();

        // Id-only tables have nothing to update.
        if assigned.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            descriptor.table,
            self.dialect.assignments(descriptor.non_id_columns(), 1),
            self.id_predicate(descriptor, assigned.len() + 1)
        );
        self.log_statement(&sql);
        let query = assigned
            .into_iter()
            .fold(sqlx::query(&sql), bind_value);
        bind_value(query, id).execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn delete_row(&mut self, descriptor: &EntityDescriptor, id: &SqlValue) -> KeelResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            descriptor.table,
            self.id_predicate(descriptor, 1)
        );
        self.log_statement(&sql);
        bind_value(sqlx::query(&sql), id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn apply(&mut self, write: &PendingWrite) -> KeelResult<()> {
        match write.kind {
            WriteKind::Insert => self.insert_row(&write.descriptor, &write.values).await,
            WriteKind::Merge => {
                if self.exists_row(&write.descriptor, &write.id).await? {
                    self.update_row(&write.descriptor, &write.id, &write.values).await
                } else {
                    self.insert_row(&write.descriptor, &write.values).await
                }
            }
            WriteKind::Delete => self.delete_row(&write.descriptor, &write.id).await,
        }
    }
}

#[async_trait]
impl PersistenceContext for SqlSession {
    async fn find<E: Entity>(
        &mut self,
        descriptor: &EntityDescriptor,
        id: SqlValue,
    ) -> KeelResult<Option<E>> {
        self.flush().await?;

        let sql = format!(
            "{} WHERE {}",
            self.select_sql(descriptor),
            self.id_predicate(descriptor, 1)
        );
        self.log_statement(&sql);

        let row = bind_value(sqlx::query(&sql), &id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(E::from_row).transpose()?)
    }

    async fn persist<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<()> {
        let values = entity_values(descriptor, entity)?;
        self.pending.push(PendingWrite {
            kind: WriteKind::Insert,
            descriptor: *descriptor,
            id: entity.id().into(),
            values,
        });
        Ok(())
    }

    async fn merge<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<E> {
        let values = entity_values(descriptor, entity)?;
        self.pending.push(PendingWrite {
            kind: WriteKind::Merge,
            descriptor: *descriptor,
            id: entity.id().into(),
            values,
        });
        Ok(entity.clone())
    }

    async fn remove<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<()> {
        self.pending.push(PendingWrite {
            kind: WriteKind::Delete,
            descriptor: *descriptor,
            id: entity.id().into(),
            values: Vec::new(),
        });
        Ok(())
    }

    async fn find_all<E: Entity>(&mut self, descriptor: &EntityDescriptor) -> KeelResult<Vec<E>> {
        self.flush().await?;

        let sql = self.select_sql(descriptor);
        self.log_statement(&sql);

        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;
        let entities = rows
            .iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entities)
    }

    async fn count(&mut self, descriptor: &EntityDescriptor) -> KeelResult<u64> {
        self.flush().await?;

        let sql = format!("SELECT COUNT(*) FROM {}", descriptor.table);
        self.log_statement(&sql);

        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *self.tx).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn delete_all(&mut self, descriptor: &EntityDescriptor) -> KeelResult<u64> {
        self.flush().await?;

        let sql = format!("DELETE FROM {}", descriptor.table);
        self.log_statement(&sql);

        let result = sqlx::query(&sql).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn flush(&mut self) -> KeelResult<()> {
        if let Some(reason) = &self.rollback_only {
            return Err(KeelError::RollbackOnly(reason.clone()));
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        debug!(count = self.pending.len(), "Flushing pending writes");
        let mut writes = std::mem::take(&mut self.pending).into_iter();
        while let Some(write) = writes.next() {
            if let Err(e) = self.apply(&write).await {
                warn!(
                    entity = write.descriptor.name,
                    id = %write.id,
                    "Flush failed, session is now rollback-only: {}",
                    e
                );
                self.pending = std::iter::once(write).chain(writes).collect();
                self.rollback_only = Some(e.to_string());
                return Err(e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlSession")
            .field("dialect", &self.dialect)
            .field("pending", &self.pending.len())
            .field("rollback_only", &self.rollback_only.is_some())
            .finish_non_exhaustive()
    }
}

fn bind_value<'q>(query: AnyQuery<'q>, value: &SqlValue) -> AnyQuery<'q> {
    match value {
        SqlValue::Null(SqlKind::Bool) => query.bind(None::<bool>),
        SqlValue::Null(SqlKind::Int) => query.bind(None::<i64>),
        SqlValue::Null(SqlKind::Float) => query.bind(None::<f64>),
        SqlValue::Null(SqlKind::Text) => query.bind(None::<String>),
        SqlValue::Null(SqlKind::Bytes) => query.bind(None::<Vec<u8>>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Bytes(v) => query.bind(v.clone()),
    }
}
