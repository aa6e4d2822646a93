//! Repository layer for the family graph store.
//!
//! # Responsibility
//! - Define row-level data access contracts used by the sync steps.
//! - Isolate SQLite query details from reconciliation logic.
//!
//! # Invariants
//! - Repositories never open or commit transactions; callers hand them a
//!   connection that is already inside the unit of work.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod family_repo;
pub mod member_repo;
pub mod relationship_repo;
mod sql;
