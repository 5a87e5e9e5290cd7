//! Arena-backed document tree shared by every crate in the vellum engine.
//!
//! A [`Document`] owns a flat arena of [`Node`]s addressed by [`NodeId`];
//! parent/child links are plain indices rather than reference-counted
//! pointers, so the tree can be walked, cloned, and spliced without any risk
//! of reference cycles. [`LogDocument`] reuses the same tree shape as a
//! structured diagnostic sink.

mod document;
mod log;
mod node;

pub use document::Document;
pub use log::LogDocument;
pub use node::{Node, NodeId, NodeKind};
