//! `GenericDao`, the one [`BaseDao`] implementation.
//!
//! Each method forwards to the caller's [`PersistenceContext`] using the
//! entity descriptor captured at construction. `persist` and `update`
//! flush immediately; reads rely on the context's auto-flush.
//!
//! [`BaseDao`]: crate::dao::BaseDao
//! [`PersistenceContext`]: crate::PersistenceContext

use crate::{dao::BaseDao, PersistenceContext};
use async_trait::async_trait;
use keel_core::{Entity, EntityDescriptor, KeelResult};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// DAO bound to the entity type `E` for its whole lifetime.
pub struct GenericDao<E: Entity> {
    descriptor: EntityDescriptor,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> GenericDao<E> {
    /// Creates a DAO for `E`, resolving its table mapping once.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: EntityDescriptor::of::<E>(),
            _entity: PhantomData,
        }
    }

    /// Returns the table mapping this DAO is bound to.
    #[must_use]
    pub const fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }
}

impl<E: Entity> Default for GenericDao<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for GenericDao<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity> BaseDao<E> for GenericDao<E> {
    async fn persist<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<()> {
        ctx.persist(&self.descriptor, entity).await?;
        ctx.flush().await?;

        debug!(entity = self.descriptor.name, id = ?entity.id(), "Dao: persist");
        Ok(())
    }

    async fn update<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<E> {
        let updated = ctx.merge(&self.descriptor, entity).await?;
        ctx.flush().await?;

        debug!(entity = self.descriptor.name, id = ?entity.id(), "Dao: update entity");
        Ok(updated)
    }

    async fn update_all<C: PersistenceContext>(&self, ctx: &mut C, entities: Vec<E>) -> KeelResult<Vec<E>> {
        let mut updated = Vec::with_capacity(entities.len());
        for entity in &entities {
            updated.push(ctx.merge(&self.descriptor, entity).await?);
        }
        ctx.flush().await?;

        debug!(entity = self.descriptor.name, count = updated.len(), "Dao: update entities");
        Ok(updated)
    }

    async fn exists<C: PersistenceContext>(&self, ctx: &mut C, id: Option<&E::Id>) -> KeelResult<bool> {
        let found = match id {
            Some(id) => ctx
                .find::<E>(&self.descriptor, id.clone().into())
                .await?
                .is_some(),
            None => false,
        };

        debug!(entity = self.descriptor.name, id = ?id, found, "Dao: exists");
        Ok(found)
    }

    async fn find_by_id<C: PersistenceContext>(&self, ctx: &mut C, id: &E::Id) -> KeelResult<Option<E>> {
        let found = ctx.find::<E>(&self.descriptor, id.clone().into()).await?;

        debug!(entity = self.descriptor.name, id = ?id, "Dao: find_by_id");
        Ok(found)
    }

    async fn find_all<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<Vec<E>> {
        let results = ctx.find_all::<E>(&self.descriptor).await?;

        debug!(entity = self.descriptor.name, count = results.len(), "Dao: find_all");
        Ok(results)
    }

    async fn find_all_by_ids<C: PersistenceContext>(
        &self,
        ctx: &mut C,
        ids: Vec<Option<E::Id>>,
    ) -> KeelResult<Vec<E>> {
        let mut results = Vec::new();
        for id in ids.iter().flatten() {
            if let Some(found) = self.find_by_id(ctx, id).await? {
                results.push(found);
            }
        }

        debug!(
            entity = self.descriptor.name,
            requested = ids.len(),
            found = results.len(),
            "Dao: find_all ids"
        );
        Ok(results)
    }

    async fn count<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<u64> {
        let count = ctx.count(&self.descriptor).await?;

        debug!(entity = self.descriptor.name, count, "Dao: count");
        Ok(count)
    }

    async fn delete_by_id<C: PersistenceContext>(&self, ctx: &mut C, id: &E::Id) -> KeelResult<()> {
        match self.find_by_id(ctx, id).await? {
            Some(found) => self.delete(ctx, &found).await?,
            None => warn!(
                "Did not delete {} with id {:?} because no entity with that id was found",
                self.descriptor.name, id
            ),
        }

        debug!(entity = self.descriptor.name, id = ?id, "Dao: delete_by_id");
        Ok(())
    }

    async fn delete<C: PersistenceContext>(&self, ctx: &mut C, entity: &E) -> KeelResult<()> {
        ctx.remove(&self.descriptor, entity).await?;

        debug!(entity = self.descriptor.name, id = ?entity.id(), "Dao: delete entity");
        Ok(())
    }

    async fn delete_all_entities<C: PersistenceContext>(
        &self,
        ctx: &mut C,
        entities: Vec<Option<E>>,
    ) -> KeelResult<()> {
        for entity in entities.iter().flatten() {
            self.delete(ctx, entity).await?;
        }

        debug!(entity = self.descriptor.name, "Dao: delete entities");
        Ok(())
    }

    async fn delete_all<C: PersistenceContext>(&self, ctx: &mut C) -> KeelResult<u64> {
        let deleted = ctx.delete_all(&self.descriptor).await?;

        debug!(entity = self.descriptor.name, deleted, "Dao: delete_all");
        Ok(deleted)
    }
}

impl<E: Entity> std::fmt::Debug for GenericDao<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericDao")
            .field("entity", &self.descriptor.name)
            .field("table", &self.descriptor.table)
            .finish()
    }
}
