//! Composition root: pairs a parametric canopy with its line set and keeps
//! the two consistent when parameters change.

pub mod attachment;
pub mod project;

pub use attachment::{Attachment, LoadAssignment};
pub use project::{CurveSlot, GliderProject};
