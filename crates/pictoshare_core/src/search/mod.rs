//! Visible-set query entry points.
//!
//! # Responsibility
//! - Build the exact set of pictograms a caller may see.
//! - Keep title-search shaping and ranking inside core.

pub mod visible;
