//! Family graph domain model.
//!
//! # Responsibility
//! - Define the persisted shapes of families, members and relationships.
//! - Define the client draft shape accepted by sync.
//!
//! # Invariants
//! - Families and members are identified by client-assigned durable ids.
//! - A family exclusively owns its members and relationships.

pub mod draft;
pub mod family;
pub mod identity;
pub mod member;
pub mod relationship;
