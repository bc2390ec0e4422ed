//! DAO (Data Access Object) layer.
//!
//! [`BaseDao`] is the operation set every entity DAO supports.
//! [`GenericDao`] implements it once for any [`Entity`] by delegating to
//! a [`PersistenceContext`].
//!
//! ```text
//! Service → BaseDao<E> (interface) → GenericDao<E> (impl) → PersistenceContext → DB
//! ```
//!
//! [`Entity`]: keel_core::Entity
//! [`PersistenceContext`]: crate::PersistenceContext

pub mod base_dao;
pub mod r#impl;

pub use base_dao::BaseDao;
pub use r#impl::GenericDao;
