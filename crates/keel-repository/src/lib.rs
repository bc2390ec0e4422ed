//! # Keel Repository
//!
//! Generic data access over a relational persistence context:
//!
//! ```text
//! Application
//!   ↓  BaseDao<E>                 (DAO interface)
//! GenericDao<E>                   (DAO impl, bound to one entity type)
//!   ↓  &mut impl PersistenceContext
//! SqlSession                      (unit of work over a sqlx transaction)
//!   ↓
//! MySQL / PostgreSQL / SQLite
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   pool.rs                  ← DatabasePool, begins sessions
//!   dialect.rs               ← placeholder syntax per backend
//!   di.rs                    ← PersistenceModule (shaku)
//!   context/
//!     mod.rs                 ← PersistenceContext trait
//!     sql_session.rs         ← SqlSession
//!   dao/
//!     base_dao.rs            ← BaseDao trait
//!     impl/
//!       generic_dao.rs       ← GenericDao
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let pool = DatabasePool::connect(&config).await?;
//! let books = GenericDao::<Book>::new();
//!
//! let mut session = pool.begin().await?;
//! books.persist(&mut session, &book).await?;
//! let total = books.count(&mut session).await?;
//! session.commit().await?;
//! ```

pub mod context;
pub mod dao;
pub mod di;
pub mod dialect;
pub mod pool;

pub use context::{PersistenceContext, SqlSession};
pub use dao::{BaseDao, GenericDao};
pub use di::*;
pub use dialect::SqlDialect;
pub use pool::*;
