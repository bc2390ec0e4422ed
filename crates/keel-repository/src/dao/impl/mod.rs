//! DAO implementations.
//!
//! Trait definitions live in the parent `dao/` module (`base_dao.rs`).

pub mod generic_dao;

pub use generic_dao::GenericDao;
