//! Access-level resolution.
//!
//! # Responsibility
//! - Decide whether a caller may see or mutate a given pictogram.
//! - Keep the per-tier ownership predicates in one place.
//!
//! # Invariants
//! - Resolution is pure: no I/O, no mutation, never panics.
//! - Corrupt tier/scope combinations resolve to denied, never to an error.

pub mod ownership;
