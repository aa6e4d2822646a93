//! Family graph synchronization engine.
//!
//! # Responsibility
//! - Reconcile one client draft against the store as a single unit of work.
//! - Run family upsert, member reconciliation and relationship replacement in
//!   that fixed order inside one transaction.
//!
//! # Invariants
//! - A failed sync commits nothing; the previously stored tree stays intact.
//! - Re-submitting the same draft leaves family and member ids unchanged.
//! - Every committed relationship references members of its own family.

pub mod error;
pub mod family_upsert;
pub mod identity;
pub mod member_reconciler;
pub mod orchestrator;
pub mod relationship_reconciler;
pub mod snapshot;
