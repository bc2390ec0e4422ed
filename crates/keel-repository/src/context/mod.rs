//! Persistence contexts.
//!
//! A persistence context is the unit-of-work object DAOs delegate to. It
//! tracks pending writes for one transaction and turns entity operations
//! into SQL. Contexts are owned by the caller and passed into every DAO
//! call, so the caller decides where the transaction begins and ends.

mod sql_session;

pub use sql_session::SqlSession;

use async_trait::async_trait;
use keel_core::{Entity, EntityDescriptor, KeelError, KeelResult, SqlValue};

/// Entity-manager operations a DAO delegates to.
///
/// Reads (`find`, `find_all`, `count`) and `delete_all` flush pending
/// writes before they run, so they observe earlier writes of the same
/// unit of work.
#[async_trait]
pub trait PersistenceContext: Send {
    /// Loads the entity with the given identity.
    async fn find<E: Entity>(
        &mut self,
        descriptor: &EntityDescriptor,
        id: SqlValue,
    ) -> KeelResult<Option<E>>;

    /// Schedules the entity for insertion.
    async fn persist<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<()>;

    /// Schedules an insert-or-update of the entity's state and returns the
    /// managed copy.
    async fn merge<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<E>;

    /// Schedules deletion of the entity by identity.
    async fn remove<E: Entity>(&mut self, descriptor: &EntityDescriptor, entity: &E) -> KeelResult<()>;

    /// Loads every entity of the described type.
    async fn find_all<E: Entity>(&mut self, descriptor: &EntityDescriptor) -> KeelResult<Vec<E>>;

    /// Counts rows of the described type.
    async fn count(&mut self, descriptor: &EntityDescriptor) -> KeelResult<u64>;

    /// Deletes every row of the described type in one statement.
    /// Runs immediately and returns the number of rows affected.
    async fn delete_all(&mut self, descriptor: &EntityDescriptor) -> KeelResult<u64>;

    /// Executes pending writes in the order they were scheduled.
    async fn flush(&mut self) -> KeelResult<()>;
}

/// Returns the entity's column values, checked against its descriptor.
pub(crate) fn entity_values<E: Entity>(
    descriptor: &EntityDescriptor,
    entity: &E,
) -> KeelResult<Vec<SqlValue>> {
    let values = entity.values();
    if values.len() != descriptor.columns.len() {
        return Err(KeelError::mapping(
            descriptor.name,
            format!(
                "expected {} values for columns {:?}, got {}",
                descriptor.columns.len(),
                descriptor.columns,
                values.len()
            ),
        ));
    }
    Ok(values)
}
