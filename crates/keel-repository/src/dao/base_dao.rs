//! BaseDao trait: the generic data access contract.
//!
//! Every operation takes the caller's [`PersistenceContext`] as its first
//! argument. The caller owns the unit of work: it begins the session,
//! passes it to any number of DAO calls, then commits or rolls back.
//!
//! Failures from the persistence engine (constraint violations, lost
//! connections, a closed transaction) propagate unchanged as
//! [`KeelError::Database`](keel_core::KeelError::Database).

use crate::PersistenceContext;
use async_trait::async_trait;
use keel_core::{Entity, KeelResult};

/// Data access object for one entity type.
#[async_trait]
pub trait BaseDao<E: Entity>: Send + Sync {
    /// Registers a new entity for insertion and flushes.
    async fn persist<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<()>;

    /// Merges the entity's state into the context, flushes, and returns
    /// the managed copy.
    async fn update<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<E>;

    /// Merges every entity, flushes once, and returns the managed copies
    /// in input order.
    async fn update_all<C: PersistenceContext>(&self, ctx: &mut C, entities: Vec<E>) -> KeelResult<Vec<E>>;

    /// Checks whether a record with the given identity exists.
    /// `None` is never found.
    async fn exists<C: PersistenceContext>(&self, ctx: &mut C, id: Option<&E::Id>) -> KeelResult<bool>;

    /// Finds an entity by identity.
    async fn find_by_id<C: PersistenceContext>(&self, ctx: &mut C, id: &E::Id) -> KeelResult<Option<E>>;

    /// Returns every record of the bound type.
    async fn find_all<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<Vec<E>>;

    /// Returns the records found for the given ids.
    /// `None` ids and misses are skipped.
    async fn find_all_by_ids<C: PersistenceContext>(
        &self,
        ctx: &mut C,
        ids: Vec<Option<E::Id>>,
    ) -> KeelResult<Vec<E>>;

    /// Counts records of the bound type.
    async fn count<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<u64>;

    /// Deletes the record with the given identity. A missing record is
    /// logged and otherwise ignored.
    async fn delete_by_id<C: PersistenceContext>(&self, ctx: &mut C, id: &E::Id) -> KeelResult<()>;

    /// Removes the entity.
    async fn delete<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<()>;

    /// Removes every given entity, skipping `None` entries.
    async fn delete_all_entities<C: PersistenceContext>(
        &self,
        ctx: &mut C,
        entities: Vec<Option<E>>,
    ) -> KeelResult<()>;

    /// Deletes every record of the bound type in a single statement.
    /// Returns the number of rows affected.
    async fn delete_all<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<u64>;
}
