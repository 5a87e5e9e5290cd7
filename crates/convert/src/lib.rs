//! The compile -> link -> rewrite conversion pipeline.
//!
//! [`Converter`] is the engine's core: it resolves a style module's
//! directive repository, walks an input [`vellum_dom::Document`] through
//! the compile phase (`compile`), the link phase (`link`), and the final
//! rewrite walk (`rewrite`), and returns the converted document alongside
//! a diagnostic [`vellum_dom::LogDocument`].

mod annotation;
mod compile;
mod context;
mod converter;
mod error;
mod link;
mod parser_iface;
mod rewrite;
mod script_host;

pub use annotation::{Annotation, Annotations};
pub use compile::compile_phase;
pub use context::PhaseContext;
pub use converter::Converter;
pub use error::ConvertError;
pub use link::link_phase;
pub use parser_iface::TextParser;
pub use rewrite::{rewrite_phase, RewriteState};
pub use script_host::ScriptHost;
