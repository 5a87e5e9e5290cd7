//! The directive contract, registry, and matcher shared across the vellum
//! conversion engine.
//!
//! A directive (`NodeConverter`) describes one named transformation rule;
//! the `DirectiveRegistry` holds every registered rule for a style module;
//! `match_node` answers, for a given tree node, which directives apply and
//! in what order.

mod context;
mod converter;
mod error;
mod matcher;
mod registry;
mod restrict;
mod template;

pub use context::ConvertContext;
pub use converter::{MatchInfo, NodeConverter};
pub use error::DirectiveError;
pub use matcher::{match_node, Match};
pub use registry::DirectiveRegistry;
pub use restrict::Restrict;
pub use template::TemplateOptions;
