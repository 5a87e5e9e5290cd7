//! Style module contract and registry.
//!
//! A [`StyleModule`] bundles the directive repository and the optional
//! final-conversion hooks for one `(from, to, style)` triple. [`StyleRegistry`]
//! registers modules by key at startup instead of discovering them from the
//! filesystem.

mod config;
mod error;
mod module;
mod registry;

pub use config::{merge_defaults, ConfigValue};
pub use error::StyleError;
pub use module::{StyleInfo, StyleModule};
pub use registry::{module_key, StyleRegistry};
