//! # Blog Core
//!
//! The domain layer of the blog backend.
//! This crate contains entity types and ports with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
