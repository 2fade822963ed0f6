//! Domain model for shared pictogram resources.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the tier/ownership shape in one place for all components.
//!
//! # Invariants
//! - Every pictogram is identified by a stable `PictogramId`.
//! - A pictogram's access level and its ownership scope must agree.

pub mod identity;
pub mod pictogram;
