//! Use-case services over the family store.
//!
//! # Responsibility
//! - Give callers one entry point per use case (sync a draft, load a tree).
//! - Keep presentation layers decoupled from SQLite and transaction details.

pub mod family_service;
