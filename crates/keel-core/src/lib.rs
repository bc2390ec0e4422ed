//! # Keel Core
//!
//! Core types, traits, and error definitions shared by the Keel crates.
//! Entities describe their own table mapping through [`Entity`], which
//! the data access layer captures once per DAO as an [`EntityDescriptor`].

pub mod entity;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod value;

pub use entity::*;
pub use error::*;
pub use result::*;
pub use value::*;

// Re-export shaku for dependency injection
pub use shaku::{module, Component, HasComponent, Interface};
