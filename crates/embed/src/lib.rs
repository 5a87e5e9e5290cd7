//! Embedded-execution support: runs the script carried by a `script`
//! processing instruction and splices its effects into the tree it was
//! found in.
//!
//! [`EmbedEngine`] implements `vellum_convert::ScriptHost` with `rhai` as
//! the evaluator. A script's host-visible surface is `echo`, `include`,
//! `import_module`, and a shared `__NAMESPACE__` handle; [`EngineContext`]
//! holds the current-node/converter stacks and the namespace across calls.

mod commands;
mod context;
mod engine;
mod error;

pub use commands::{EchoValue, IncludeOptions, ScriptCommand};
pub use context::{ConverterFrame, EngineContext};
pub use engine::EmbedEngine;
pub use error::EmbedError;
