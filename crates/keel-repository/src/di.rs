//! Dependency injection module using Shaku.
//!
//! `PersistenceModule` provides the shared [`DatabasePool`]. DAOs are
//! stateless apart from their entity binding and are built directly with
//! [`GenericDao::new`](crate::GenericDao::new).

use crate::DatabasePool;
use keel_config::DatabaseConfig;
use keel_core::{module, KeelResult};
use std::sync::Arc;

module! {
    pub PersistenceModule {
        components = [
            DatabasePool,
        ],
        providers = [],
    }
}

/// Connects the pool described by `config` and wraps it in a module.
pub async fn build_persistence_module(config: &DatabaseConfig) -> KeelResult<Arc<PersistenceModule>> {
    let db_pool = DatabasePool::connect(config).await?;

    let module = PersistenceModule::builder()
        .with_component_parameters::<DatabasePool>(db_pool.parameters())
        .build();

    Ok(Arc::new(module))
}
